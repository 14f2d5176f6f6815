pub mod captions;
pub mod client;
pub mod types;

pub use captions::OpenAiCaptionClient;

#[cfg(test)]
macro_rules! impl_with_openai_base_url {
    ($client:ty) => {
        impl $client {
            fn with_base_url(mut self, base_url: String) -> Self {
                self.http = self.http.with_base_url(base_url);
                self
            }
        }
    };
}
#[cfg(test)]
pub(crate) use impl_with_openai_base_url;

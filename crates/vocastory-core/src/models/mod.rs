pub mod credentials;
pub mod draft;
pub mod record;
pub mod vocabulary;

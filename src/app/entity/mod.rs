pub mod asset_documents;
pub mod assets;
pub mod clients;
pub mod contracts;
pub mod payments;

pub mod client;
pub mod flaresolverr;

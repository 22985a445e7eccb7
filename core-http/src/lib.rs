//! # HTTP Client Abstraction
//!
//! Thin HTTP seam shared by all provider clients.
//!
//! Provider clients depend on `Arc<dyn HttpClient>` rather than a concrete
//! HTTP library so that tests can substitute scripted responses without any
//! network access. The production implementation is [`ReqwestHttpClient`].

pub mod client;
pub mod error;
pub mod reqwest_client;

pub use client::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use error::{HttpError, Result};
pub use reqwest_client::ReqwestHttpClient;

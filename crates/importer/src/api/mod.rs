mod client;

pub use client::EventsApiClient;

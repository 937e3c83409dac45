//! API calls against the chat backend's services

pub mod client;
pub mod fcm;
pub mod firestore;
pub mod onesignal;

pub use client::ProbeClient;

// Utility modules - networking and retry helpers

pub mod network;
pub mod retry;

//! # IO Module
//!
//! Interface layer between the outside world and the domain services. The
//! only interface today is the REST API under [`rest`].

pub mod rest;

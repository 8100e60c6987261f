//! # Remote REST Store
//!
//! Talks to the hosted Postgres database through its PostgREST endpoint
//! (`/rest/v1/<table>` and `/rest/v1/rpc/<function>`).
//!
//! Every repository call is exactly one HTTP request. There is no retry, no
//! request deduplication and no timeout beyond the HTTP client defaults: a
//! failure surfaces to the caller as an error with context attached.

pub mod client;
pub mod repositories;

pub use client::{Order, Query, RestClient, StoreError};
pub use repositories::{
    RestEvolutionRepository, RestSequenceRepository, RestStudentRepository,
    RestTransactionItemRepository, RestTransactionRepository,
};

use crate::backend::storage::traits::Connection;

/// Connection to the remote store, cheap to clone
#[derive(Clone)]
pub struct RestConnection {
    client: RestClient,
}

impl RestConnection {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: RestClient::new(base_url, api_key),
        }
    }
}

impl Connection for RestConnection {
    type StudentRepository = RestStudentRepository;
    type EvolutionRepository = RestEvolutionRepository;
    type TransactionRepository = RestTransactionRepository;
    type TransactionItemRepository = RestTransactionItemRepository;
    type SequenceRepository = RestSequenceRepository;

    fn create_student_repository(&self) -> Self::StudentRepository {
        RestStudentRepository::new(self.client.clone())
    }

    fn create_evolution_repository(&self) -> Self::EvolutionRepository {
        RestEvolutionRepository::new(self.client.clone())
    }

    fn create_transaction_repository(&self) -> Self::TransactionRepository {
        RestTransactionRepository::new(self.client.clone())
    }

    fn create_transaction_item_repository(&self) -> Self::TransactionItemRepository {
        RestTransactionItemRepository::new(self.client.clone())
    }

    fn create_sequence_repository(&self) -> Self::SequenceRepository {
        RestSequenceRepository::new(self.client.clone())
    }
}

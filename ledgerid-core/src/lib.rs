pub mod flight;
pub mod gateway;
pub mod identity;
pub mod network;

pub use gateway::{
    dispatch::{DispatchTable, FunctionShape},
    invoke::TransactionGateway,
    types::{Registration, SubmitResult, TransactionRequest, TransactionResult},
};
pub use identity::{
    manager::{IdentityManager, IdentityManagerBuilder},
    types::{EnrollmentOutcome, RegistrationRequest, UserAttributes},
};
pub use network::{
    error::NetworkError,
    in_memory::{InMemoryLedger, SubmittedTransaction},
    traits::{ChannelNetwork, ConnectOptions, Contract, DiscoveryOptions, LedgerGateway, LedgerNetwork},
};

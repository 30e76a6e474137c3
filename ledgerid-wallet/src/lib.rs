pub mod fs;
pub mod memory;
pub mod set;
pub mod store;

pub use fs::FileSystemWallet;
pub use memory::InMemoryWallet;
pub use set::WalletSet;
pub use store::{is_valid_label, IdentityStore};

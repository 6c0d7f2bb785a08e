mod domains;
mod estimate;
mod export;
mod list;
mod noise;
mod quick;
mod store;
pub mod util;

pub use domains::{run_domains, DomainsOptions};
pub use estimate::{run_estimate, EstimateOptions};
pub use export::{run_export, ExportOptions};
pub use list::{run_list, ListOptions};
pub use noise::{run_noise, NoiseOptions};
pub use quick::{run_quick, QuickOptions};
pub use store::{
    run_store_copy, run_store_save, run_store_show, StoreCopyOptions, StoreSaveOptions,
};
pub use util::SnapshotSource;

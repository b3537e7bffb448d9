pub mod profile;
pub mod layout;
pub mod assets;

pub use profile::VoiceProfile;
pub use layout::RvcLayout;
pub use assets::{AssetLocator, StageOutcome, StageReport};

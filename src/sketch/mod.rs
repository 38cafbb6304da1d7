pub mod count_min;
pub mod doorkeeper;
pub(crate) mod table;

pub use count_min::FrequencySketch;
pub use doorkeeper::{Doorkeeper, MembershipFilter};

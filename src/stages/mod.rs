pub mod stage0_segment;
pub mod stage1_extract;
pub mod stage2_entities;
pub mod stage3_deadline;
pub mod stage4_priority;
pub mod stage5_dependencies;
pub mod stage6_skills;
pub mod stage7_assign;
pub mod stage_validate;

pub use stage0_segment::*;
pub use stage1_extract::*;
pub use stage2_entities::*;
pub use stage3_deadline::*;
pub use stage4_priority::*;
pub use stage5_dependencies::*;
pub use stage6_skills::*;
pub use stage7_assign::*;
pub use stage_validate::*;

mod machine;
mod stage;
mod work_order;

pub use machine::WorkLifecycle;
pub use stage::Stage;
pub use work_order::{WorkOrder, WorkOrderFields, WorkOrderId};

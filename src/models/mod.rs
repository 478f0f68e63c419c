pub mod work_item;

pub use work_item::{
    InMemoryTaskStore, Priority, TaskStore, WorkItem, WorkItemDescriptor, WorkItemStatus,
};

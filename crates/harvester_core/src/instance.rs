/// One execution of a business process together with the IDs of its tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    process_instance_id: String,
    task_ids: Vec<String>,
}

impl Instance {
    /// A freshly discovered instance; its task list is filled in later.
    pub fn new(process_instance_id: impl Into<String>) -> Self {
        Self {
            process_instance_id: process_instance_id.into(),
            task_ids: Vec::new(),
        }
    }

    /// Consumes the instance and returns it with its task list populated.
    pub fn with_task_ids(self, task_ids: Vec<String>) -> Self {
        Self {
            process_instance_id: self.process_instance_id,
            task_ids,
        }
    }

    pub fn process_instance_id(&self) -> &str {
        &self.process_instance_id
    }

    pub fn task_ids(&self) -> &[String] {
        &self.task_ids
    }
}

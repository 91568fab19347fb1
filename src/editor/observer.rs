use super::Document;

/// What a committed command did.
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    Inserted { node_id: String },
    Deleted { node_ids: Vec<String> },
    Connected { edge_id: String },
    StepUpdated { node_id: String },
    PropertiesUpdated,
    /// The whole graph was rebuilt from a new definition.
    Reloaded,
    CatalogChanged,
    LaidOut,
}

/// Gets called after every command that changed the document, with the
/// document already in its settled state.
pub trait EditObserver: Send {
    fn on_edit(&mut self, event: &EditEvent, document: &Document);
}

impl<F> EditObserver for F
where
    F: FnMut(&EditEvent, &Document) + Send,
{
    fn on_edit(&mut self, event: &EditEvent, document: &Document) {
        self(event, document)
    }
}

mod child_resolution;
mod generic;

pub use child_resolution::{ChildResolution, ResolvedChild};
pub use generic::GenericWidget;

use serde_json::{Map, Value};

use tether_shared::AdapterId;

/// One event emitted by a widget's event stream.
#[derive(Clone, Debug, PartialEq)]
pub enum WidgetEvent {
    /// A local property mutation settled on `value`. Widgets may coerce
    /// an applied value, in which case the settled value is emitted.
    PropertyChange { name: String, value: Value },
    /// A user-driven widget event with an arbitrary payload.
    Action {
        event_type: String,
        data: Map<String, Value>,
    },
    /// The widget is going away.
    Destroy,
}

impl WidgetEvent {
    pub fn event_type(&self) -> &str {
        match self {
            WidgetEvent::PropertyChange { .. } => "propertyChange",
            WidgetEvent::Action { event_type, .. } => event_type,
            WidgetEvent::Destroy => "destroy",
        }
    }
}

/// The local mutable object an adapter mirrors.
///
/// Event delivery is queue-style: mutations return the events they
/// emit and the owning adapter drains them through its single internal
/// handler. Relational (adapter-valued) properties are flagged through
/// [`is_widget_property`](Self::is_widget_property); their values are
/// adapter ids, which relational sync resolves through the registry.
///
/// `parent` is the structural nesting relation used for composition and
/// rendering. It is independent of ownership: nesting never decides who
/// may destroy what.
pub trait Widget {
    fn object_type(&self) -> &str;

    fn parent(&self) -> Option<&AdapterId>;

    fn set_parent(&mut self, parent: Option<AdapterId>);

    fn property(&self, name: &str) -> Option<&Value>;

    /// Applies a property value and returns the events the mutation
    /// emitted.
    fn set_property(&mut self, name: &str, value: Value) -> Vec<WidgetEvent>;

    /// Whether `name` is an adapter-valued (relational) property.
    fn is_widget_property(&self, name: &str) -> bool;

    /// Handles a model action. Returns false when the action is not
    /// recognized by this widget; the adapter then logs an
    /// unsupported-action diagnostic.
    fn invoke_action(&mut self, action: &str, data: &Map<String, Value>) -> bool;

    /// Tears the widget down and returns any events emitted on the way
    /// out.
    fn destroy(&mut self) -> Vec<WidgetEvent>;
}

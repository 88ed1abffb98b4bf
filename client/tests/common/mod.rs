#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde_json::{Map, Value};

use tether_client::{
    AdapterData, AdapterId, DefaultValues, EventTransport, GenericWidget, ObjectFactory,
    RemoteEvent, Session, SessionConfig, Widget, WidgetEvent,
};

pub type SentEvents = Rc<RefCell<Vec<(RemoteEvent, Option<Duration>)>>>;

/// Transport that records every delivered event for assertions.
pub struct RecordingTransport {
    sent: SentEvents,
}

impl RecordingTransport {
    pub fn new() -> (Self, SentEvents) {
        let sent: SentEvents = Rc::new(RefCell::new(Vec::new()));
        (Self { sent: sent.clone() }, sent)
    }
}

impl EventTransport for RecordingTransport {
    fn deliver(&mut self, event: RemoteEvent, delay: Option<Duration>) {
        self.sent.borrow_mut().push((event, delay));
    }
}

pub fn new_session() -> (Session, SentEvents) {
    new_session_with(SessionConfig::default(), ObjectFactory::new())
}

pub fn new_session_with(config: SessionConfig, factory: ObjectFactory) -> (Session, SentEvents) {
    let _ = env_logger::builder().is_test(true).try_init();
    let (transport, sent) = RecordingTransport::new();
    let session = Session::new(config, factory, DefaultValues::new(), Box::new(transport));
    (session, sent)
}

pub fn id(raw: &str) -> AdapterId {
    AdapterId::new(raw)
}

/// Widget that clamps its `count` property at 10, so an incoming value
/// above the bound settles on a different value than the server sent.
pub struct ClampedWidget {
    inner: GenericWidget,
}

pub fn clamped_widget(data: &AdapterData) -> Box<dyn Widget> {
    Box::new(ClampedWidget {
        inner: GenericWidget::from_data(data),
    })
}

impl Widget for ClampedWidget {
    fn object_type(&self) -> &str {
        self.inner.object_type()
    }

    fn parent(&self) -> Option<&AdapterId> {
        self.inner.parent()
    }

    fn set_parent(&mut self, parent: Option<AdapterId>) {
        self.inner.set_parent(parent);
    }

    fn property(&self, name: &str) -> Option<&Value> {
        self.inner.property(name)
    }

    fn set_property(&mut self, name: &str, value: Value) -> Vec<WidgetEvent> {
        let value = match (name, value.as_i64()) {
            ("count", Some(count)) if count > 10 => Value::from(10),
            (_, _) => value,
        };
        self.inner.set_property(name, value)
    }

    fn is_widget_property(&self, name: &str) -> bool {
        self.inner.is_widget_property(name)
    }

    fn invoke_action(&mut self, action: &str, data: &Map<String, Value>) -> bool {
        self.inner.invoke_action(action, data)
    }

    fn destroy(&mut self) -> Vec<WidgetEvent> {
        self.inner.destroy()
    }
}

mod property_change_filter;
mod widget_event_filter;

pub use property_change_filter::PropertyChangeEventFilter;
pub use widget_event_filter::WidgetEventTypeFilter;

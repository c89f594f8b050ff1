use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use super::CheckResult;

fn micros(d: std::time::Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

impl CheckResult {
    /// Builds the published event fields for this result.
    pub fn to_event(&self) -> Value {
        let mut monitor = Map::new();
        monitor.insert("id".into(), json!(self.target.id));
        monitor.insert("status".into(), json!(self.status));
        monitor.insert("scheme".into(), json!("tcp"));
        monitor.insert("host".into(), json!(self.target.host));
        monitor.insert("duration".into(), json!({ "us": micros(self.duration) }));
        if let Some(ip) = self.resolved_ip {
            monitor.insert("ip".into(), json!(ip.to_string()));
        }

        let mut tcp = Map::new();
        tcp.insert("port".into(), json!(self.target.port));
        if let Some(dial) = self.dial.as_ref().filter(|d| d.connected) {
            tcp.insert("rtt".into(), json!({ "connect": { "us": micros(dial.duration) } }));
        }

        let mut event = Map::new();
        event.insert("monitor".into(), Value::Object(monitor));
        event.insert("tcp".into(), Value::Object(tcp));

        if let (true, Some(ip)) = (self.resolve.looked_up, self.resolve.ip()) {
            event.insert(
                "resolve".into(),
                json!({
                    "host": self.target.host,
                    "ip": ip.to_string(),
                    "rtt": { "us": micros(self.resolve.duration) },
                }),
            );
        }

        if let Some(err) = &self.error {
            event.insert("error".into(), json!({ "message": err.message, "type": err.kind }));
        }

        Value::Object(event)
    }
}

impl Serialize for CheckResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_event().serialize(serializer)
    }
}

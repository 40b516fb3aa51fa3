use chrono::NaiveDateTime;
use std::fmt;

/// A decoded reading from a charge controller.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// Scaled measurement (volts, amps, watts, kWh, ...).
    Gauge(f64),

    /// Unscaled integer register (capacity, durations, percentages).
    Counter(u64),

    /// Single flag.
    Boolean(bool),

    /// Enumerated setting or status name.
    Text(String),

    /// Device clock reading.
    DateTime(NaiveDateTime),

    /// Named sub-values decoded from one register block, in register order.
    Fields(Vec<(String, MetricValue)>),
}

impl MetricValue {
    /// Build a `Fields` value from `(name, value)` pairs.
    pub fn fields<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<MetricValue>,
    {
        MetricValue::Fields(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Look up a named sub-value of a `Fields` value.
    pub fn field(&self, name: &str) -> Option<&MetricValue> {
        match self {
            MetricValue::Fields(fields) => {
                fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
            }
            _ => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Keeps the decimal point on whole values (18.0, not 18).
            MetricValue::Gauge(v) => write!(f, "{:?}", v),
            MetricValue::Counter(v) => write!(f, "{}", v),
            MetricValue::Boolean(v) => write!(f, "{}", v),
            MetricValue::Text(v) => f.write_str(v),
            MetricValue::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
            MetricValue::Fields(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Gauge(v)
    }
}

impl From<u64> for MetricValue {
    fn from(v: u64) -> Self {
        MetricValue::Counter(v)
    }
}

impl From<u16> for MetricValue {
    fn from(v: u16) -> Self {
        MetricValue::Counter(u64::from(v))
    }
}

impl From<bool> for MetricValue {
    fn from(v: bool) -> Self {
        MetricValue::Boolean(v)
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_string())
    }
}

impl From<NaiveDateTime> for MetricValue {
    fn from(v: NaiveDateTime) -> Self {
        MetricValue::DateTime(v)
    }
}

//! Canonical encoding of criteria for cache keys

use std::collections::BTreeSet;
use std::fmt::Write;

use serde_json::{Number, Value};

use super::InvestmentCriteria;

/// Encodes criteria into a stable compact JSON string
///
/// Fields are written in a fixed order, sets in sorted order and numbers in
/// their shortest round-trip form, so semantically identical criteria always
/// produce the same string.
pub fn canonical_key(criteria: &InvestmentCriteria) -> String {
    let mut encoder = Encoder::default();

    encoder.tags("sectors", criteria.sectors());
    encoder.number("fees_max", criteria.fees_max());
    encoder.number("min_performance", criteria.min_performance());
    encoder.tags("region", criteria.region());
    encoder.tags("type", criteria.product_type());
    encoder.text("replication", criteria.replication());
    encoder.tags("availability", criteria.availability());
    encoder.number("risk", criteria.risk());
    encoder.text("strategy", criteria.strategy());
    encoder.integer("esg", criteria.esg());
    encoder.tags("emetteur", criteria.emetteur());

    encoder.finish()
}

#[derive(Default)]
struct Encoder {
    out: String,
    fields: usize,
}

impl Encoder {
    fn field(&mut self, name: &str) {
        self.out.push(if self.fields == 0 { '{' } else { ',' });
        self.out.push_str(&quote(name));
        self.out.push(':');
        self.fields += 1;
    }

    fn tags(&mut self, name: &str, tags: &BTreeSet<String>) {
        self.field(name);
        self.out.push('[');

        for (i, tag) in tags.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.out.push_str(&quote(tag));
        }

        self.out.push(']');
    }

    fn number(&mut self, name: &str, value: Option<f64>) {
        self.field(name);

        match value.map(|v| if v == 0.0 { 0.0 } else { v }).and_then(Number::from_f64) {
            Some(number) => {
                let _ = write!(self.out, "{}", number);
            }
            None => self.out.push_str("null"),
        }
    }

    fn integer(&mut self, name: &str, value: Option<i64>) {
        self.field(name);

        match value {
            Some(value) => {
                let _ = write!(self.out, "{}", value);
            }
            None => self.out.push_str("null"),
        }
    }

    fn text(&mut self, name: &str, value: Option<&str>) {
        self.field(name);

        match value {
            Some(value) => self.out.push_str(&quote(value)),
            None => self.out.push_str("null"),
        }
    }

    fn finish(mut self) -> String {
        if self.fields == 0 {
            self.out.push('{');
        }
        self.out.push('}');
        self.out
    }
}

fn quote(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

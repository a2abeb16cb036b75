use anyhow::{bail, Context, Result};
use std::collections::HashMap;

/// Form fields decoded from an `application/x-www-form-urlencoded` body.
///
/// When a key repeats, the first value wins; later occurrences are dropped.
pub struct FormFields {
    items: HashMap<String, String>,
}

impl FormFields {
    pub fn parse(body: &str) -> Result<Self> {
        let mut items = HashMap::new();

        for pair in body.split('&') {
            if pair.is_empty() {
                continue;
            }
            if pair.contains(';') {
                bail!("invalid semicolon separator in query");
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(key)?;
            let value = decode_component(value)?;
            items.entry(key).or_insert(value);
        }

        Ok(Self { items })
    }

    /// Value for `name`, or the empty string when the field is absent.
    pub fn get(&self, name: &str) -> &str {
        self.items.get(name).map(String::as_str).unwrap_or("")
    }
}

fn decode_component(raw: &str) -> Result<String> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hi = bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16));
                let lo = bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16));
                let (Some(hi), Some(lo)) = (hi, lo) else {
                    bail!("invalid URL escape in {raw:?}");
                };
                out.push((hi * 16 + lo) as u8);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8(out).with_context(|| format!("decoded value of {raw:?} is not utf-8"))
}

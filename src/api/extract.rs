use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{Form, FromRequest, Json, Request},
    http::header::CONTENT_TYPE,
};
use serde_json::{Map, Value};

/// Request body for the echo endpoint.
///
/// JSON and URL-encoded form bodies are decoded into a JSON object, forms with
/// bracketed keys into nested objects and arrays. Anything
/// else (no body, another content type, malformed input, a non-object JSON
/// value) becomes an empty object, so extraction never rejects a request.
#[derive(Debug, Default, PartialEq)]
pub struct EchoBody(pub Map<String, Value>);

#[derive(Debug, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Other,
}

fn body_kind(content_type: Option<&str>) -> BodyKind {
    let Some(content_type) = content_type else {
        return BodyKind::Other;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json")) {
        BodyKind::Json
    } else if mime == "application/x-www-form-urlencoded" {
        BodyKind::Form
    } else {
        BodyKind::Other
    }
}

fn object_or_empty(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Deepest bracket level split into nested values; anything past it stays one key.
const MAX_DEPTH: usize = 5;
/// Objects whose keys are all indices up to this bound are turned into arrays.
const MAX_ARRAY_INDEX: usize = 20;

/// Builds a JSON object from decoded form pairs, qs style: `a[b]=c` nests,
/// `a[]=x` appends, and a repeated key collects its values into an array.
fn nest_pairs(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut root = Map::new();
    for (key, value) in pairs {
        let (head, segments) = split_key(&key);
        let incoming = segments
            .iter()
            .rev()
            .fold(Value::String(value), |inner, segment| {
                if segment.is_empty() {
                    Value::Array(vec![inner])
                } else {
                    let mut map = Map::new();
                    map.insert(segment.clone(), inner);
                    Value::Object(map)
                }
            });
        insert_merged(&mut root, head, incoming);
    }

    root.into_iter()
        .map(|(key, value)| (key, compact_arrays(value)))
        .collect()
}

/// Splits `user[address][city]` into `user` and `["address", "city"]`.
fn split_key(key: &str) -> (String, Vec<String>) {
    let Some(open) = key.find('[').filter(|&i| i > 0) else {
        return (key.to_string(), Vec::new());
    };

    let head = key[..open].to_string();
    let mut segments = Vec::new();
    let mut rest = &key[open..];
    while let Some(inner) = rest.strip_prefix('[') {
        if segments.len() == MAX_DEPTH {
            break;
        }
        let Some(close) = inner.find(']') else {
            break;
        };
        segments.push(inner[..close].to_string());
        rest = &inner[close + 1..];
    }
    if !rest.is_empty() {
        segments.push(rest.to_string());
    }

    (head, segments)
}

fn insert_merged(map: &mut Map<String, Value>, key: String, incoming: Value) {
    match map.remove(&key) {
        Some(existing) => {
            map.insert(key, merge(existing, incoming));
        }
        None => {
            map.insert(key, incoming);
        }
    }
}

fn merge(existing: Value, incoming: Value) -> Value {
    match (existing, incoming) {
        (Value::Object(mut target), Value::Object(source)) => {
            for (key, value) in source {
                insert_merged(&mut target, key, value);
            }
            Value::Object(target)
        }
        (Value::Array(mut target), Value::Array(source)) => {
            target.extend(source);
            Value::Array(target)
        }
        (Value::Array(mut target), other) => {
            target.push(other);
            Value::Array(target)
        }
        (other, Value::Array(source)) => {
            let mut target = vec![other];
            target.extend(source);
            Value::Array(target)
        }
        (other, incoming) => Value::Array(vec![other, incoming]),
    }
}

/// `{"0": x, "1": y}` becomes `[x, y]`, ordered by index with gaps dropped.
fn compact_arrays(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let indexed: Option<Vec<usize>> = map
                .keys()
                .map(|key| parse_index(key))
                .collect();
            match indexed {
                Some(_) if !map.is_empty() => {
                    let mut items: Vec<(usize, Value)> = map
                        .into_iter()
                        .filter_map(|(key, value)| parse_index(&key).map(|i| (i, compact_arrays(value))))
                        .collect();
                    items.sort_by_key(|(index, _)| *index);
                    Value::Array(items.into_iter().map(|(_, value)| value).collect())
                }
                _ => Value::Object(
                    map.into_iter()
                        .map(|(key, value)| (key, compact_arrays(value)))
                        .collect(),
                ),
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(compact_arrays).collect()),
        other => other,
    }
}

fn parse_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<usize>().ok().filter(|&i| i <= MAX_ARRAY_INDEX)
}

#[async_trait]
impl<S> FromRequest<S> for EchoBody
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let body = match body_kind(content_type.as_deref()) {
            BodyKind::Json => match Json::<Value>::from_request(req, state).await {
                Ok(Json(value)) => object_or_empty(value),
                Err(rejection) => {
                    tracing::debug!(%rejection, "ignoring unreadable JSON body");
                    Map::new()
                }
            },
            BodyKind::Form => {
                match Form::<Vec<(String, String)>>::from_request(req, state).await {
                    Ok(Form(pairs)) => nest_pairs(pairs),
                    Err(rejection) => {
                        tracing::debug!(%rejection, "ignoring unreadable form body");
                        Map::new()
                    }
                }
            }
            BodyKind::Other => Map::new(),
        };

        Ok(EchoBody(body))
    }
}

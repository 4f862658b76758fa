use super::{error::RuntimeErrorKind, Value};
use compact_str::CompactString;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

/// A mutable list shared by every value that refers to it.
#[derive(Clone, Default)]
pub struct List(Arc<Mutex<Vec<Value>>>);

impl std::fmt::Debug for List {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "List(len={})", self.len())
    }
}

impl List {
    pub fn new(values: Vec<Value>) -> Self {
        Self(Arc::new(Mutex::new(values)))
    }

    /// A copy of the elements, so that no lock is held while they are used.
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set(&self, index: usize, value: Value) -> Result<(), RuntimeErrorKind> {
        let mut values = self.0.lock();
        let slot = values
            .get_mut(index)
            .ok_or(RuntimeErrorKind::IndexOutOfRange)?;
        *slot = value;
        Ok(())
    }

    pub fn ptr_eq(&self, other: &List) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    pub fn concat(&self, other: &List) -> List {
        let mut values = self.snapshot();
        values.extend(other.snapshot());
        List::new(values)
    }

    /// Elements of `self` missing from `other`, each kept once, in first-occurrence order.
    pub fn difference(&self, other: &List) -> List {
        let excluded: Vec<DictKey> = other.snapshot().iter().map(DictKey::member).collect();
        let mut seen = Vec::new();
        let mut values = Vec::new();
        for value in self.snapshot() {
            let key = DictKey::member(&value);
            if excluded.contains(&key) || seen.contains(&key) {
                continue;
            }
            seen.push(key);
            values.push(value);
        }
        List::new(values)
    }

    /// The distinct elements, in first-occurrence order.
    pub fn unique(&self) -> List {
        self.difference(&List::default())
    }
}

/// Hashable projection of a value used to index dictionaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DictKey {
    Nil,
    Bool(bool),
    Number(u64),
    String(CompactString),
    Reference(usize),
}

impl DictKey {
    /// Lists and dictionaries are mutable and cannot be used as keys.
    pub fn try_from_value(value: &Value) -> Result<Self, RuntimeErrorKind> {
        match value {
            Value::List(_) | Value::Dict(_) => Err(RuntimeErrorKind::UnhashableKey),
            value => Ok(Self::member(value)),
        }
    }

    /// Identity used for list set operations, where lists and dictionaries compare by reference.
    pub fn member(value: &Value) -> Self {
        match value {
            Value::Nil => DictKey::Nil,
            Value::Bool(value) => DictKey::Bool(*value),
            Value::Number(value) => DictKey::Number(canonical_bits(*value)),
            Value::String(value) => DictKey::String(value.clone()),
            Value::List(list) => DictKey::Reference(list.address()),
            Value::Dict(dict) => DictKey::Reference(dict.address()),
            Value::Function(function) => {
                DictKey::Reference(Arc::as_ptr(function) as *const () as usize)
            }
            Value::Class(class) => DictKey::Reference(Arc::as_ptr(class) as *const () as usize),
            Value::Instance(instance) => {
                DictKey::Reference(Arc::as_ptr(instance) as *const () as usize)
            }
            Value::NativeFunction(function) => {
                DictKey::Reference(Arc::as_ptr(function) as *const () as usize)
            }
            Value::NativeObject(object) => {
                DictKey::Reference(Arc::as_ptr(object) as *const () as usize)
            }
        }
    }
}

fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

#[derive(Default)]
struct DictEntries {
    index: HashMap<DictKey, usize>,
    entries: Vec<(Value, Value)>,
}

impl DictEntries {
    fn insert(&mut self, key: DictKey, key_value: Value, value: Value) {
        match self.index.get(&key) {
            Some(&position) => self.entries[position].1 = value,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push((key_value, value));
            }
        }
    }
}

/// A mutable dictionary that iterates in insertion order.
#[derive(Clone, Default)]
pub struct Dict(Arc<Mutex<DictEntries>>);

impl std::fmt::Debug for Dict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Dict(len={})", self.len())
    }
}

impl Dict {
    pub fn from_entries(entries: Vec<(Value, Value)>) -> Result<Self, RuntimeErrorKind> {
        let dict = Dict::default();
        for (key, value) in entries {
            dict.insert(key, value)?;
        }
        Ok(dict)
    }

    pub fn len(&self) -> usize {
        self.0.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &Value) -> Result<Option<Value>, RuntimeErrorKind> {
        let key = DictKey::try_from_value(key)?;
        let inner = self.0.lock();
        Ok(inner
            .index
            .get(&key)
            .map(|&position| inner.entries[position].1.clone()))
    }

    pub fn insert(&self, key: Value, value: Value) -> Result<(), RuntimeErrorKind> {
        let hashed = DictKey::try_from_value(&key)?;
        self.0.lock().insert(hashed, key, value);
        Ok(())
    }

    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.0.lock().entries.clone()
    }

    pub fn ptr_eq(&self, other: &Dict) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    /// Union of both dictionaries where keys of `other` win.
    pub fn union(&self, other: &Dict) -> Dict {
        let mut merged = DictEntries::default();
        for (key, value) in self.entries().into_iter().chain(other.entries()) {
            merged.insert(DictKey::member(&key), key, value);
        }
        Dict(Arc::new(Mutex::new(merged)))
    }
}

/// The evaluated components of an index expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slice {
    Index(i64),
    Range {
        start: Option<i64>,
        end: Option<i64>,
        step: Option<i64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection<T> {
    Element(T),
    Range(Vec<T>),
}

impl Slice {
    /// A single index must be in bounds. Range bounds are clamped, and the step keeps the
    /// positions of the sub-range that are multiples of it.
    pub fn select<T: Clone>(&self, items: &[T]) -> Result<Selection<T>, RuntimeErrorKind> {
        let length = items.len() as i64;
        match *self {
            Slice::Index(index) => {
                if index < 0 || index >= length {
                    return Err(RuntimeErrorKind::IndexOutOfRange);
                }
                Ok(Selection::Element(items[index as usize].clone()))
            }
            Slice::Range { start, end, step } => {
                let start = start.unwrap_or(0).clamp(0, length) as usize;
                let end = end.unwrap_or(length).clamp(0, length) as usize;
                if start >= end {
                    return Ok(Selection::Range(Vec::new()));
                }
                let range = &items[start..end];
                let step = step.unwrap_or(1);
                if step <= 1 {
                    return Ok(Selection::Range(range.to_vec()));
                }
                if step > range.len() as i64 {
                    return Ok(Selection::Range(Vec::new()));
                }
                Ok(Selection::Range(
                    range.iter().step_by(step as usize).cloned().collect(),
                ))
            }
        }
    }
}

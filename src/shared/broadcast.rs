//! Per-item parameter broadcasting for batch inputs.

/// A parameter given either once for the whole batch or once per item.
#[derive(Debug, Clone, PartialEq)]
pub enum PerItem<T> {
    Same(T),
    Each(Vec<T>),
}

impl<T: Clone> PerItem<T> {
    /// Expand to exactly `len` values.
    ///
    /// A short `Each` list is padded with its last value (or `default` when
    /// empty); a long one is truncated.
    pub fn expand(param: Option<&PerItem<T>>, len: usize, default: T) -> Vec<T> {
        match param {
            None => vec![default; len],
            Some(PerItem::Same(v)) => vec![v.clone(); len],
            Some(PerItem::Each(values)) => {
                let mut out: Vec<T> = values.iter().take(len).cloned().collect();
                let pad = values.last().cloned().unwrap_or(default);
                out.resize(len, pad);
                out
            }
        }
    }
}

impl<T> From<T> for PerItem<T> {
    fn from(v: T) -> Self {
        PerItem::Same(v)
    }
}

impl<T> PerItem<T> {
    pub fn each(values: impl IntoIterator<Item = impl Into<T>>) -> Self {
        PerItem::Each(values.into_iter().map(Into::into).collect())
    }
}

use crate::data::sample::{Sample, SeriesKey};

/// A group of same-key samples, in their original row order.
pub type Group<'s> = (SeriesKey, Vec<&'s Sample>);

/// Keep the samples whose scheme and operation both appear in the
/// allow-lists. Entries that match nothing in the data are ignored.
/// Samples without a scheme/operation label never pass.
pub fn filter_samples<'s, S, O>(samples: &'s [Sample], schemes: &[S], operations: &[O]) -> Vec<&'s Sample>
where
    S: AsRef<str>,
    O: AsRef<str>,
{
    samples
        .iter()
        .filter(|s| match (s.key.scheme(), s.key.operation()) {
            (Some(scheme), Some(operation)) => {
                schemes.iter().any(|a| a.as_ref() == scheme)
                    && operations.iter().any(|a| a.as_ref() == operation)
            }
            _ => false,
        })
        .collect()
}

/// One group per `(scheme, operation)` combination of the allow-lists,
/// schemes outermost. Combinations with no samples yield empty groups.
pub fn group_by_allow_list<'s, S, O>(samples: &[&'s Sample], schemes: &[S], operations: &[O]) -> Vec<Group<'s>>
where
    S: AsRef<str>,
    O: AsRef<str>,
{
    let mut groups = Vec::with_capacity(schemes.len() * operations.len());
    for scheme in schemes {
        for operation in operations {
            let key = SeriesKey::pair(scheme.as_ref(), operation.as_ref());
            let members: Vec<&Sample> = samples.iter().copied().filter(|s| s.key == key).collect();
            groups.push((key, members));
        }
    }
    groups
}

/// Group by key in order of first appearance. Used for run-keyed data,
/// where the keys are not known up front.
pub fn group_by_key(samples: &[Sample]) -> Vec<Group<'_>> {
    let mut groups: Vec<Group<'_>> = Vec::new();
    for sample in samples {
        match groups.iter_mut().find(|(key, _)| *key == sample.key) {
            Some((_, members)) => members.push(sample),
            None => groups.push((sample.key.clone(), vec![sample])),
        }
    }
    groups
}

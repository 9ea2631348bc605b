//! Helpers for CMake list values (`a;b;c`) as dumped from target properties.

const DIRECTORY_ID_START: &str = "::@(";
const DIRECTORY_ID_END: &str = ");";
const DIRECTORY_ENTRY_END: &str = ";::@";
const LINK_ONLY_PREFIX: &[u8] = b"$<LINK_ONLY:";

/// Splits a CMake list. An empty value is an empty list.
pub fn split_cmake_list(value: &str) -> Vec<&str> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(';').collect()
}

/// Unwraps entries linked from a different directory than the one defining them.
///
/// CMake writes those as `::@(<directory id>);NAME;::@`, which becomes `NAME`. An unclosed wrapper
/// stops the scan and is left in place.
pub fn strip_directory_ids(value: &mut String) {
    while let Some(start) = value.find(DIRECTORY_ID_START) {
        let Some(id_end) = value[start..].find(DIRECTORY_ID_END).map(|pos| pos + start) else {
            break;
        };
        let name_start = id_end + DIRECTORY_ID_END.len();
        let Some(entry_end) = value[name_start..]
            .find(DIRECTORY_ENTRY_END)
            .map(|pos| pos + name_start)
        else {
            break;
        };

        value.replace_range(entry_end..entry_end + DIRECTORY_ENTRY_END.len(), "");
        value.replace_range(start..name_start, "");
    }
}

/// Removes entries that are wrapped in `$<LINK_ONLY:...>` in the non-evaluated value.
///
/// Evaluating the list resolves `$<LINK_ONLY:X>` to `X`, although such entries do not take part
/// in the link interface. Elements are matched by position, counting `;` outside generator
/// expressions. A malformed expression leaves `evaluated` untouched.
pub fn remove_link_only_entries(evaluated: &mut String, raw: &str) {
    if !raw.contains('$') {
        return;
    }

    let bytes = raw.as_bytes();
    let mut depth = 0usize;
    let mut element_index = 0usize;
    let mut prefix_matched = false;
    let mut indices_to_remove = Vec::new();

    for position in 0..bytes.len() {
        let current = bytes[position];
        let previous = if position > 0 { bytes[position - 1] } else { 0 };

        if previous == b'$' && current == b'<' {
            depth += 1;
            continue;
        }

        if previous != b'\\' && current == b'>' {
            if depth == 0 {
                tracing::debug!("Malformed generator expression in {:?}", raw);
                return;
            }
            depth -= 1;
            if depth == 0 && prefix_matched {
                indices_to_remove.push(element_index);
                prefix_matched = false;
            }
            continue;
        }

        if previous != b'\\' && current == b';' && depth == 0 {
            element_index += 1;
            continue;
        }

        if depth == 1
            && !prefix_matched
            && position >= LINK_ONLY_PREFIX.len()
            && &bytes[position - LINK_ONLY_PREFIX.len()..position] == LINK_ONLY_PREFIX
        {
            prefix_matched = true;
        }
    }

    if indices_to_remove.is_empty() {
        return;
    }

    let kept: Vec<&str> = evaluated
        .split(';')
        .enumerate()
        .filter(|(index, _)| !indices_to_remove.contains(index))
        .map(|(_, entry)| entry)
        .collect();
    *evaluated = kept.join(";");
}

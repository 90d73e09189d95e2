/*!
 * Proportional splitting of translated sentences.
 *
 * All positions are character positions. Cuts land on whitespace whenever a
 * whitespace character exists near the proportional target.
 */

const MIN_SEARCH_WINDOW: usize = 10;
const SEARCH_WINDOW_RATIO: f64 = 0.2;

/// Split `text` into exactly `ratios.len()` fragments sized after `ratios`.
///
/// Fragments are trimmed. When the text has fewer natural pieces than requested,
/// the longest fragment is bisected at its most central whitespace; once no
/// fragment can be bisected, empty fragments pad the end.
pub fn smart_split(text: &str, ratios: &[f64]) -> Vec<String> {
    let count = ratios.len();
    if count == 0 {
        return Vec::new();
    }

    let trimmed = text.trim();
    if count == 1 {
        return vec![trimmed.to_string()];
    }

    let chars: Vec<char> = trimmed.chars().collect();
    let total_len = chars.len();
    let window = MIN_SEARCH_WINDOW.max((total_len as f64 * SEARCH_WINDOW_RATIO).floor() as usize);

    let mut parts = Vec::with_capacity(count);
    let mut cursor = 0;

    for ratio in &ratios[..count - 1] {
        let target_len = (total_len as f64 * ratio.max(0.0)).floor() as usize;
        let target_pos = (cursor + target_len).min(total_len);
        let split = find_best_split_position(&chars, cursor, target_pos, total_len, window);

        push_trimmed(&mut parts, &chars[cursor..split]);
        cursor = split;
    }
    push_trimmed(&mut parts, &chars[cursor..]);

    while parts.len() < count {
        if parts.is_empty() {
            parts.push(String::new());
            continue;
        }

        let longest = longest_part(&parts);
        let part_chars: Vec<char> = parts[longest].chars().collect();
        let mid = part_chars.len() / 2;
        let split = find_nearest_whitespace(&part_chars, mid);

        if let Some(split) = split.filter(|&s| s > 0 && s < part_chars.len()) {
            let left: String = part_chars[..split].iter().collect();
            let right: String = part_chars[split..].iter().collect();
            parts.splice(longest..=longest, [left.trim().to_string(), right.trim().to_string()]);
        } else {
            parts.push(String::new());
        }
    }

    parts.truncate(count);
    parts
}

fn push_trimmed(parts: &mut Vec<String>, slice: &[char]) {
    let piece: String = slice.iter().collect();
    let piece = piece.trim();
    if !piece.is_empty() {
        parts.push(piece.to_string());
    }
}

// @returns: Position of the first longest part
fn longest_part(parts: &[String]) -> usize {
    let mut best = 0;
    let mut best_len = 0;
    for (i, part) in parts.iter().enumerate() {
        let len = part.chars().count();
        if len > best_len {
            best = i;
            best_len = len;
        }
    }
    best
}

/// Whitespace closest to `target`, strictly between `start` and `end`, within `window`.
///
/// Offsets are scanned from `-window` upwards and a candidate only replaces the
/// current one when strictly closer, so the left candidate wins a tie. Returns
/// `target` when no whitespace is in range.
pub fn find_best_split_position(chars: &[char], start: usize, target: usize, end: usize, window: usize) -> usize {
    let mut best = target;
    let mut best_distance = usize::MAX;

    for offset in -(window as isize)..=(window as isize) {
        let pos = target as isize + offset;
        if pos <= start as isize || pos >= end as isize {
            continue;
        }
        let pos = pos as usize;
        if chars[pos].is_whitespace() {
            let distance = offset.unsigned_abs();
            if distance < best_distance {
                best = pos;
                best_distance = distance;
            }
        }
    }

    best
}

/// Whitespace nearest to `pos`, checking one step left then one step right in turn
pub fn find_nearest_whitespace(chars: &[char], pos: usize) -> Option<usize> {
    let len = chars.len();
    let mut left = pos;
    let mut right = pos;

    while left > 0 || right < len {
        if left > 0 {
            left -= 1;
            if chars[left].is_whitespace() {
                return Some(left);
            }
        }
        if right < len {
            if chars[right].is_whitespace() {
                return Some(right);
            }
            right += 1;
        }
    }

    None
}

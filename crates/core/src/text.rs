//! String and randomness helpers used by scripts.

use rand::seq::SliceRandom;
use rand::Rng;

/// Turn a namespaced id into a display name.
///
/// `minecraft:diamond_sword` becomes `Diamond Sword`. Ids without a namespace
/// are translated whole.
pub fn id_translate(id: &str) -> String {
    let name = id.split_once(':').map_or(id, |(_, name)| name);
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uppercase the first character of `word`.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Pick a random element, or `None` for an empty slice.
pub fn random_element<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    items.choose(rng)
}

/// Generate a random RFC 4122 version 4 UUID string.
pub fn generate_uuid_v4<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut bytes: [u8; 16] = rng.gen();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

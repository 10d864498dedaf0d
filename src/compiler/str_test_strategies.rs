use proptest::prelude::*;


pub(crate) fn constant_chunk_strategy() -> impl Strategy<Value = String> {
    (prop_oneof![Just(""), Just("+"), Just("-")], 0u32..=9999)
        .prop_map(|(sign, n)| format!("{sign}{n}"))
}

fn count_strategy() -> impl Strategy<Value = String> {
    prop::option::of(1u16..=100).prop_map(|count| match count {
        Some(n) => n.to_string(),
        None => String::new(),
    })
}

fn faces_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u16..=1000).prop_map(|n| n.to_string()),
        Just("f".to_owned()),
        Just("%".to_owned()),
    ]
}

fn modifier_strategy() -> impl Strategy<Value = String> {
    let keep_drop = (
        prop_oneof!["kh", "kl", "dh", "dl"],
        prop::option::of(0u16..=99),
    )
        .prop_map(|(token, n)| match n {
            Some(n) => format!("{token}{n}"),
            None => token,
        });

    // Signed-argument modifiers always get an explicit argument here so a
    // following chunk's sign cannot be swallowed as the argument.
    let signed = (
        prop_oneof!["r", "t", "!"],
        prop_oneof![Just(""), Just("+"), Just("-")],
        0u16..=99,
    )
        .prop_map(|(token, sign, n)| format!("{token}{sign}{n}"));

    prop_oneof![keep_drop, signed]
}

pub(crate) fn dice_chunk_strategy() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just(""), Just("+"), Just("-")],
        count_strategy(),
        faces_strategy(),
        prop::option::of(modifier_strategy()),
    )
        .prop_map(|(sign, count, faces, modifier)| {
            format!("{sign}{count}d{faces}{}", modifier.unwrap_or_default())
        })
}

fn signed_chunk_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (prop_oneof![r"\+", "-"], 0u32..=999).prop_map(|(sign, n)| format!("{sign}{n}")),
        (
            prop_oneof![r"\+", "-"],
            count_strategy(),
            faces_strategy(),
            prop::option::of(modifier_strategy()),
        )
            .prop_map(|(sign, count, faces, modifier)| {
                format!("{sign}{count}d{faces}{}", modifier.unwrap_or_default())
            }),
    ]
}

/// Builds a full expression within every compile-time limit: a leading
/// chunk plus up to three signed chunks keeps the worst case (four chunks
/// of at most 13 characters) under the 60-character budget.
pub(crate) fn expression_strategy() -> impl Strategy<Value = String> {
    (
        prop_oneof![constant_chunk_strategy(), dice_chunk_strategy()],
        prop::collection::vec(signed_chunk_strategy(), 0..=3),
    )
        .prop_map(|(first, rest)| {
            let mut expr = first;
            for chunk in rest {
                expr.push_str(&chunk);
            }
            expr
        })
}

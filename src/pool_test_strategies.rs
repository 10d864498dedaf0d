use proptest::prelude::*;
use crate::pool::{DicePool, Faces, Modifier};


pub(crate) fn faces_strategy() -> impl Strategy<Value = Faces> {
    prop_oneof![
        (2u16..=100).prop_map(Faces::Sides),
        Just(Faces::Fudge),
        Just(Faces::Percentile),
    ]
}

pub(crate) fn modifier_strategy(count: u16, faces: Faces) -> impl Strategy<Value = Modifier> {
    let n = 0..=count;
    let target = faces.lowest()..=faces.highest();

    prop_oneof![
        Just(Modifier::None),
        target.clone().prop_map(Modifier::reroll),
        target.clone().prop_map(Modifier::twice),
        target.prop_map(Modifier::explode),
        n.clone().prop_map(Modifier::kh),
        n.clone().prop_map(Modifier::kl),
        n.clone().prop_map(Modifier::dh),
        n.prop_map(Modifier::dl),
    ]
}

pub(crate) fn pool_strategy() -> impl Strategy<Value = DicePool> {
    (1u16..=20, faces_strategy(), any::<bool>()).prop_flat_map(|(count, faces, negative)| {
        modifier_strategy(count, faces).prop_map(move |modifier| DicePool {
            count,
            faces,
            negative,
            modifier,
        })
    })
}

use dice_engine::RollResult;

fn printed(res: &RollResult) -> String {
    format!("{}{}", res.expression().unwrap_or_default(), res)
}

#[test]
fn expression_lists_rolls_and_addition() {
    let res = RollResult {
        total: 16,
        roll_count: 3,
        constant_addition: 2,
        breakdown: Some(vec![3, 1, 6]),
    };
    insta::assert_snapshot!(printed(&res), @"3 + 1 + 6 + 3 × 2 = 16");
}

#[test]
fn single_roll_with_addition() {
    let res = RollResult {
        total: 9,
        roll_count: 1,
        constant_addition: 5,
        breakdown: Some(vec![4]),
    };
    insta::assert_snapshot!(printed(&res), @"4 + 1 × 5 = 9");
}

#[test]
fn addition_term_is_omitted_when_zero() {
    let res = RollResult {
        total: 7,
        roll_count: 2,
        constant_addition: 0,
        breakdown: Some(vec![2, 5]),
    };
    insta::assert_snapshot!(printed(&res), @"2 + 5 = 7");
}

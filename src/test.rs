use super::*;
use crate::pool::{FactSide, Obj};
use byteorder::ByteOrder;
use rv32::{decode, Endian, Processor, Register, StopCause};


// The fruit cake program: five initial conditions, then three rewrite
// rules forming a chain that consumes every ingredient.
const FRUIT_CAKE: &str = "|| sugar
||  oranges
|| apples  ,   apples
||  cherries
||flour

|      flour,      sugar,    apples|  apple cake
|     apples,    oranges,  cherries   |   fruit    salad
|fruit   salad,   apple  cake             |  fruit  cake   ";

const FRUIT_PORTS: &[&str] = &["@port1", "@port2", "@port3"];

fn lhs_fact(text: &str) -> Obj {
    Obj::Fact {
        text,
        register: None,
        side: FactSide::Lhs { keep: false },
    }
}

fn rhs_fact(text: &str, count: u32) -> Obj {
    Obj::Fact {
        text,
        register: None,
        side: FactSide::Rhs { count },
    }
}

/// Runs the break-loop protocol: reset the PC and clear `a0` while rules
/// keep firing. Returns the fired count of every pass, the last being 0.
fn run_to_quiescence(memory: &mut [u8]) -> Vec<u32> {
    let mut processor = Processor::new();
    let mut fired = Vec::new();

    loop {
        assert!(fired.len() < 64, "program did not settle");
        processor.set_program_counter(0);
        assert_eq!(processor.run(memory), StopCause::Break);

        let count = processor.register(Register::A0);
        fired.push(count);
        if count == 0 {
            return fired;
        }
        processor.set_register(Register::A0, 0);
    }
}

#[test]
fn parse_builds_the_pool() {
    let pool = parse("|flour, sugar?|cake : 2", &[]).unwrap();

    assert_eq!(
        pool.objects(),
        &[
            Obj::Lhs,
            lhs_fact("flour"),
            Obj::Fact {
                text: "sugar",
                register: None,
                side: FactSide::Lhs { keep: true },
            },
            Obj::Rhs,
            rhs_fact("cake", 2),
        ][..]
    );
}

#[test]
fn ports_precede_rules_in_the_pool() {
    let pool = parse("|a|b", &["@p1", "@p2"]).unwrap();

    assert_eq!(
        pool.objects()[..2],
        [
            Obj::Port {
                name: "@p1",
                register: None,
            },
            Obj::Port {
                name: "@p2",
                register: None,
            },
        ]
    );
    assert_eq!(pool.rules().count(), 1);
}

#[test]
fn first_character_fixes_the_delimiter() {
    let pool = parse("/a/b/c/d", &[]).unwrap();

    assert_eq!(
        pool.objects(),
        &[
            Obj::Lhs,
            lhs_fact("a"),
            Obj::Rhs,
            rhs_fact("b", 1),
            Obj::Lhs,
            lhs_fact("c"),
            Obj::Rhs,
            rhs_fact("d", 1),
        ][..]
    );
}

#[test]
fn counts_accept_radix_literals() {
    let pool = parse("|x| a : 0x10, b : 0o17, c : 0b101, d : 12", &[]).unwrap();

    let counts: Vec<u32> = pool
        .objects()
        .iter()
        .filter_map(|obj| match *obj {
            Obj::Fact {
                side: FactSide::Rhs { count },
                ..
            } => Some(count),
            _ => None,
        })
        .collect();

    assert_eq!(counts, vec![16, 15, 5, 12]);
}

#[test]
fn malformed_sources_are_rejected() {
    assert!(parse("", &[]).is_err());
    assert!(parse("  \n\t ", &[]).is_err());
    assert!(parse("|a,,b|c", &[]).is_err());
    assert!(parse("|a|b : 0", &[]).is_err());
    assert!(parse("|a|b : 0xFFFFFFFFF", &[]).is_err());
    assert!(parse("|a|b|", &[]).is_err());
    assert!(parse("|a : 2|b", &[]).is_err());
}

#[test]
fn interning_shares_registers_between_equal_spellings() {
    let mut pool = parse("||abc def,abc    def,abc de,efqhqi 12rq,abc def", &[]).unwrap();
    let count = intern_strings(&mut pool);

    assert_eq!(count, 3);
    let registers: Vec<u32> = pool
        .objects()
        .iter()
        .filter_map(|obj| obj.register())
        .collect();
    assert_eq!(registers, vec![0, 0, 1, 2, 0]);
}

#[test]
fn interning_the_fixture_yields_eleven_registers() {
    let mut pool = parse(FRUIT_CAKE, FRUIT_PORTS).unwrap();
    let count = intern_strings(&mut pool);

    assert_eq!(count, 11);

    let mut seen = Vec::new();
    for obj in pool.objects() {
        if let (Some(text), Some(register)) = (obj.symbol(), obj.register()) {
            let name = canon::collapse(text);
            if !seen.iter().any(|(n, _)| *n == name) {
                seen.push((name, register));
            }
        }
    }

    assert_eq!(
        seen,
        vec![
            ("@port1".to_owned(), 0),
            ("@port2".to_owned(), 1),
            ("@port3".to_owned(), 2),
            ("sugar".to_owned(), 3),
            ("oranges".to_owned(), 4),
            ("apples".to_owned(), 5),
            ("cherries".to_owned(), 6),
            ("flour".to_owned(), 7),
            ("apple cake".to_owned(), 8),
            ("fruit salad".to_owned(), 9),
            ("fruit cake".to_owned(), 10),
        ]
    );
}

#[test]
fn register_indices_are_contiguous() {
    let mut pool = parse(FRUIT_CAKE, FRUIT_PORTS).unwrap();
    let count = intern_strings(&mut pool);

    let mut present = vec![false; count as usize];
    for obj in pool.objects() {
        if let Some(register) = obj.register() {
            present[register as usize] = true;
        }
    }
    assert!(present.iter().all(|&p| p));
}

#[test]
fn empty_lhs_rules_accumulate_into_the_initial_vector() {
    let mut pool = parse(FRUIT_CAKE, FRUIT_PORTS).unwrap();
    let count = intern_strings(&mut pool);
    let initial = initial_registers(&pool, count);

    // apples appears twice on one initial rule's RHS and accumulates.
    assert_eq!(initial, vec![0, 0, 0, 1, 1, 2, 1, 1, 0, 0, 0]);
}

#[test]
fn image_starts_with_a_jump_over_the_register_words() {
    let image = compile(FRUIT_CAKE, FRUIT_PORTS).unwrap();
    let bytes = image.bytes();

    assert_eq!(bytes.len() % 4, 0);

    let entry = Endian::read_u32(&bytes[..4]);
    assert_eq!(decode::opcode(entry), Some(decode::Opcode::Jal));
    assert_eq!(decode::rd(entry), 0);
    assert_eq!(decode::j_immediate(entry), 4 + 4 * 11);
}

#[test]
fn image_embeds_the_initial_register_vector() {
    let image = compile(FRUIT_CAKE, FRUIT_PORTS).unwrap();

    let values: Vec<u32> = (0..image.register_count())
        .map(|index| image.register(index))
        .collect();
    assert_eq!(values, vec![0, 0, 0, 1, 1, 2, 1, 1, 0, 0, 0]);

    assert_eq!(
        image.symbols(),
        &[
            "@port1",
            "@port2",
            "@port3",
            "sugar",
            "oranges",
            "apples",
            "cherries",
            "flour",
            "apple cake",
            "fruit salad",
            "fruit cake",
        ][..]
    );
}

#[test]
fn a_program_of_initial_conditions_compiles_to_a_bare_trap() {
    let image = compile("||a\n||b", &[]).unwrap();

    // Entry jump, two register words, EBREAK, RET: nothing else.
    assert_eq!(image.bytes().len(), 20);
    assert_eq!(image.register(0), 1);
    assert_eq!(image.register(1), 1);

    let entry = Endian::read_u32(&image.bytes()[..4]);
    assert_eq!(decode::j_immediate(entry), 12);
    assert_eq!(Endian::read_u32(&image.bytes()[12..16]), rv32::encode::ebreak());
    assert_eq!(Endian::read_u32(&image.bytes()[16..20]), rv32::encode::ret());
}

#[test]
fn a_third_emitter_pass_is_byte_identical() {
    let mut pool = parse(FRUIT_CAKE, FRUIT_PORTS).unwrap();
    let count = intern_strings(&mut pool);

    let mut emitter = Emitter::new(&pool, count, DEFAULT_MAX_IMAGE_SIZE);
    emitter.run_pass(false).unwrap();
    emitter.run_pass(true).unwrap();
    let second = emitter.bytes().to_vec();
    emitter.run_pass(true).unwrap();

    assert_eq!(emitter.bytes(), &second[..]);
}

#[test]
fn fruit_cake_runs_to_quiescence() {
    let image = compile(FRUIT_CAKE, FRUIT_PORTS).unwrap();
    let mut memory = image.bytes().to_vec();

    let fired = run_to_quiescence(&mut memory);

    // One rule per pass: cake, salad, then the combination of the two.
    assert_eq!(fired, vec![1, 1, 1, 0]);

    let values: Vec<u32> = (0..image.register_count())
        .map(|index| register_value(&memory, index))
        .collect();
    assert_eq!(values, vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
}

#[test]
fn kept_facts_are_not_consumed() {
    let image = compile("|| sugar\n| sugar? | taste", &[]).unwrap();
    let mut memory = image.bytes().to_vec();

    // A keep-only rule re-fires forever; run a single pass.
    let mut processor = Processor::new();
    assert_eq!(processor.run(&mut memory), StopCause::Break);

    assert_eq!(processor.register(Register::A0), 1);
    assert_eq!(register_value(&memory, 0), 1);
    assert_eq!(register_value(&memory, 1), 1);
}

#[test]
fn production_scales_by_the_matched_minimum() {
    let image = compile("||fuel : 3\n|fuel|exhaust : 2", &[]).unwrap();
    let mut memory = image.bytes().to_vec();

    let fired = run_to_quiescence(&mut memory);

    assert_eq!(fired, vec![1, 0]);
    assert_eq!(register_value(&memory, 0), 0);
    assert_eq!(register_value(&memory, 1), 6);
}

#[test]
fn duplicate_lhs_facts_match_once() {
    let image = compile("||ore\n|ore, ore|ingot", &[]).unwrap();
    let mut memory = image.bytes().to_vec();

    let fired = run_to_quiescence(&mut memory);

    assert_eq!(fired, vec![1, 0]);
    assert_eq!(register_value(&memory, 0), 0);
    assert_eq!(register_value(&memory, 1), 1);
}

#[test]
fn a_fired_rule_ends_the_pass() {
    let image = compile("||a\n||b\n|a|x\n|b|y", &[]).unwrap();
    let mut memory = image.bytes().to_vec();

    let fired = run_to_quiescence(&mut memory);

    assert_eq!(fired, vec![1, 1, 0]);
    assert_eq!(register_value(&memory, 0), 0);
    assert_eq!(register_value(&memory, 1), 0);
    assert_eq!(register_value(&memory, 2), 1);
    assert_eq!(register_value(&memory, 3), 1);
}

#[test]
fn duplicate_port_names_collapse() {
    let image = compile("|a|b", &["@p", "@p"]).unwrap();

    assert_eq!(image.register_count(), 3);
    assert_eq!(image.symbols(), &["@p", "a", "b"][..]);
}

#[test]
fn oversized_images_are_rejected() {
    let result = compile_bounded(FRUIT_CAKE, FRUIT_PORTS, 64);

    assert!(matches!(
        result,
        Err(Error::Codegen(CodegenError::Overflow { max_size: 64 }))
    ));
}

#[test]
fn oversized_rewrite_counts_are_rejected() {
    let result = compile("|x|y : 5000", &[]);

    assert!(matches!(
        result,
        Err(Error::Codegen(CodegenError::ImmediateOutOfRange { value: 5000 }))
    ));
}

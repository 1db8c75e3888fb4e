use halite_ibex::config::*;
use halite_ibex::error::*;
use halite_ibex::game_loop::*;
use std::fmt::Write;
use std::io::Cursor;

const SIZE: usize = 32;

fn engine_input(turns: u32) -> String {
    let mut text = String::new();

    text.push_str("{\"MAX_TURNS\": 30, \"NEW_ENTITY_ENERGY_COST\": 1000, \"game_seed\": 7}\n");
    text.push_str("2 0\n0 8 8\n1 24 24\n32 32\n");

    for y in 0..SIZE {
        let row: Vec<String> = (0..SIZE).map(|x| ((x * 37 + y * 11) % 600).to_string()).collect();

        writeln!(text, "{}", row.join(" ")).unwrap();
    }

    for turn in 1..=turns {
        writeln!(text, "{}", turn).unwrap();
        writeln!(text, "0 2 0 {}", 4000 + turn).unwrap();
        writeln!(text, "0 9 8 {}", turn * 20).unwrap();
        writeln!(text, "2 8 10 0").unwrap();
        writeln!(text, "1 1 0 3000").unwrap();
        writeln!(text, "1 23 24 0").unwrap();
        writeln!(text, "1").unwrap();
        writeln!(text, "9 8 {}", 300 - turn).unwrap();
    }

    text
}

#[test]
fn plays_a_whole_game_over_buffers() {
    let turns = 25;
    let mut output = Vec::new();

    run(Cursor::new(engine_input(turns)), &mut output, StrategyConfig::default(), Some(3), "ibex-test").unwrap();

    let output = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines.len(), turns as usize + 1);
    assert_eq!(lines[0], "ibex-test");

    for line in &lines[1..] {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        assert!(tokens.windows(2).any(|pair| pair == ["m", "0"]), "no command for ship 0 in {:?}", line);
        assert!(tokens.windows(2).any(|pair| pair == ["m", "2"]), "no command for ship 2 in {:?}", line);
        assert!(!tokens.windows(2).any(|pair| pair == ["m", "1"]), "moved an enemy ship in {:?}", line);

        for pair in tokens.windows(3).filter(|window| window[0] == "m") {
            assert!(["n", "s", "e", "w", "o"].contains(&pair[2]), "bad direction in {:?}", line);
        }
    }
}

#[test]
fn same_seed_plays_the_same_game() {
    let play = || {
        let mut output = Vec::new();

        run(Cursor::new(engine_input(10)), &mut output, StrategyConfig::default(), Some(11), "ibex").unwrap();

        output
    };

    assert_eq!(play(), play());
}

#[test]
fn truncated_stream_is_not_an_invariant_violation() {
    let mut input = engine_input(3);
    input.truncate(input.len() - 4);

    let result = run(Cursor::new(input), Vec::new(), StrategyConfig::default(), None, "ibex");

    match result {
        Err(error @ BotError::Protocol(_)) => assert!(!error.is_fatal()),
        other => panic!("expected a protocol error, got {:?}", other),
    }
}

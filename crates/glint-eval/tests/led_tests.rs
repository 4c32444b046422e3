//! LED statement tests: declaration, updates, dumps and persistence.

use glint_eval::{Colour, ErrorKind, Interpreter, Limits, MemoryConsole, MemoryStore, FRAME_LINE};
use glint_types::ast::{DumpStmt, Expr, LedsStmt, Program, Stmt, UpdateStmt};
use glint_types::Value;

fn interp() -> Interpreter<MemoryConsole, MemoryStore> {
    Interpreter::new(MemoryConsole::default(), MemoryStore::default())
}

fn leds(size: i64, name: &str) -> Stmt {
    Stmt::Leds(LedsStmt::new(Expr::integer(size), Expr::string(name)))
}

fn update(r: i64, g: i64, b: i64, index: i64, name: &str) -> Stmt {
    Stmt::Update(UpdateStmt::new(
        Expr::integer(r),
        Expr::integer(g),
        Expr::integer(b),
        Expr::integer(index),
        Expr::string(name),
    ))
}

fn write(name: &str) -> Stmt {
    Stmt::Write(DumpStmt::new(Expr::string(name)))
}

fn info(name: &str) -> Stmt {
    Stmt::Info(DumpStmt::new(Expr::string(name)))
}

fn save(name: &str) -> Stmt {
    Stmt::Save(DumpStmt::new(Expr::string(name)))
}

// ── Declaration ───────────────────────────────────────────────────────────

#[test]
fn declared_lights_start_off() {
    let mut it = interp();
    it.run(&Program::new(vec![leds(5, "strip")])).unwrap();
    let array = it.store().get("strip").unwrap();
    assert_eq!(array.size(), 5);
    assert_eq!(array.light(1).unwrap().colour, Colour::Off);
    assert_eq!(array.light(5).unwrap().record(), "0-0-0");
}

#[test]
fn eleventh_array_exhausts_the_default_limit() {
    let mut it = interp();
    let mut stmts: Vec<Stmt> = (0..10).map(|i| leds(1, &format!("a{i}"))).collect();
    stmts.push(leds(1, "overflow"));
    let err = it.run(&Program::new(stmts)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ArrayCapacity(10)));
}

#[test]
fn duplicate_array_name_fails_while_capacity_remains() {
    let mut it = interp();
    let err = it
        .run(&Program::new(vec![leds(2, "strip"), leds(2, "strip")]))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateArray(_)));
}

#[test]
fn oversized_array_is_rejected() {
    // The literal clamp pins sizes to 255, so a limit below that is
    // needed to reach the per-array capacity check from the language.
    let mut it = Interpreter::with_limits(
        MemoryConsole::default(),
        MemoryStore::default(),
        Limits {
            max_lights: 100,
            ..Limits::default()
        },
    );
    let err = it.run(&Program::new(vec![leds(200, "huge")])).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::LightCapacity { .. }));
}

#[test]
fn array_size_can_come_from_a_variable() {
    let mut it = interp();
    it.run(&Program::new(vec![
        Stmt::assign("n", Expr::integer(4)),
        Stmt::Leds(LedsStmt::new(Expr::var("n"), Expr::string("strip"))),
    ]))
    .unwrap();
    assert_eq!(it.store().get("strip").unwrap().size(), 4);
}

// ── Updates ───────────────────────────────────────────────────────────────

#[test]
fn update_sets_channels_and_colour() {
    let mut it = interp();
    it.run(&Program::new(vec![
        leds(3, "strip"),
        update(200, 10, 10, 2, "strip"),
    ]))
    .unwrap();
    let light = it.store().get("strip").unwrap().light(2).unwrap();
    assert_eq!(light.record(), "200-10-10");
    assert_eq!(light.colour, Colour::Red);
}

#[test]
fn update_channels_pass_through_the_literal_clamp() {
    let mut it = interp();
    it.run(&Program::new(vec![
        leds(1, "strip"),
        update(9000, 10, 10, 1, "strip"),
    ]))
    .unwrap();
    let light = it.store().get("strip").unwrap().light(1).unwrap();
    assert_eq!(light.record(), "255-10-10");
    assert_eq!(light.colour, Colour::Red);
}

#[test]
fn update_of_unknown_array_reports_and_continues() {
    let mut it = interp();
    it.run(&Program::new(vec![
        update(1, 2, 3, 1, "ghost"),
        Stmt::assign("after", Expr::integer(1)),
    ]))
    .unwrap();
    assert_eq!(it.console().lines, vec!["led array not found"]);
    assert_eq!(it.global("after"), Some(Value::Integer(1)));
}

#[test]
fn out_of_range_index_is_fatal() {
    let mut it = interp();
    let err = it
        .run(&Program::new(vec![leds(3, "strip"), update(1, 2, 3, 4, "strip")]))
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::IndexOutOfRange { index: 4, size: 3, .. }
    ));

    let mut it = interp();
    let err = it
        .run(&Program::new(vec![leds(3, "strip"), update(1, 2, 3, 0, "strip")]))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::IndexOutOfRange { index: 0, .. }));
}

// ── Dumps ─────────────────────────────────────────────────────────────────

#[test]
fn write_frames_the_raw_records() {
    let mut it = interp();
    it.run(&Program::new(vec![
        leds(4, "strip"),
        update(200, 10, 10, 4, "strip"),
        write("strip"),
    ]))
    .unwrap();
    assert_eq!(
        it.console().lines,
        vec![
            "",
            FRAME_LINE,
            "||0-0-0||0-0-0||0-0-0",
            FRAME_LINE,
            "||200-10-10||0-0-0||0-0-0",
            FRAME_LINE,
        ]
    );
}

#[test]
fn info_frames_colour_names_with_a_trailing_blank() {
    let mut it = interp();
    it.run(&Program::new(vec![
        leds(3, "strip"),
        update(10, 10, 200, 1, "strip"),
        info("strip"),
    ]))
    .unwrap();
    assert_eq!(
        it.console().lines,
        vec!["", FRAME_LINE, "||BLUE||OFF||OFF", FRAME_LINE, ""]
    );
    // One frame line follows every row.
    let mut it = interp();
    it.run(&Program::new(vec![leds(6, "wide"), info("wide")]))
        .unwrap();
    assert_eq!(
        it.console().lines,
        vec![
            "",
            FRAME_LINE,
            "||OFF||OFF||OFF",
            FRAME_LINE,
            "||OFF||OFF||OFF",
            FRAME_LINE,
            "",
        ]
    );
}

#[test]
fn dump_of_unknown_array_is_silent() {
    let mut it = interp();
    it.run(&Program::new(vec![write("ghost"), info("ghost"), save("ghost")]))
        .unwrap();
    assert!(it.console().lines.is_empty());
    assert!(it.files().files.is_empty());
}

// ── Persistence ───────────────────────────────────────────────────────────

#[test]
fn save_writes_one_file_row_per_console_row() {
    let mut stmts = vec![leds(9, "grid")];
    for i in 1..=9 {
        stmts.push(update(200, 10, 10, i, "grid"));
    }
    stmts.push(write("grid"));
    stmts.push(save("grid"));

    let mut it = interp();
    it.run(&Program::new(stmts)).unwrap();

    let saved = &it.files().files["grid.txt"];
    assert_eq!(
        saved,
        "|200-10-10|200-10-10|200-10-10\n\
         |200-10-10|200-10-10|200-10-10\n\
         |200-10-10|200-10-10|200-10-10\n"
    );

    // Same cell content as the console dump, modulo delimiters.
    let console_rows: Vec<String> = it
        .console()
        .lines
        .iter()
        .filter(|l| l.starts_with("||") && **l != FRAME_LINE)
        .map(|l| l.replace("||", "|"))
        .collect();
    let file_rows: Vec<&str> = saved.lines().collect();
    assert_eq!(console_rows, file_rows);
}

#[test]
fn partial_final_row_is_padded_with_defaults() {
    let mut it = interp();
    it.run(&Program::new(vec![
        leds(4, "strip"),
        update(200, 10, 10, 4, "strip"),
        save("strip"),
    ]))
    .unwrap();
    assert_eq!(
        it.files().files["strip.txt"],
        "|0-0-0|0-0-0|0-0-0\n|200-10-10|0-0-0|0-0-0\n"
    );
}

#[test]
fn failed_save_reports_and_continues() {
    let files = MemoryStore {
        fail_next: true,
        ..MemoryStore::default()
    };
    let mut it = Interpreter::new(MemoryConsole::default(), files);
    it.run(&Program::new(vec![
        leds(1, "strip"),
        save("strip"),
        Stmt::assign("after", Expr::integer(1)),
    ]))
    .unwrap();
    assert!(it.files().files.is_empty());
    assert_eq!(it.console().lines, vec!["io error: simulated failure"]);
    assert_eq!(it.global("after"), Some(Value::Integer(1)));
}

// ── Classification through the language ───────────────────────────────────

#[test]
fn info_reflects_the_colour_table_priority() {
    // (180,180,180) misses WHITE's strict bound and lands on SILVER.
    let mut it = interp();
    it.run(&Program::new(vec![
        leds(3, "strip"),
        update(180, 180, 180, 1, "strip"),
        update(150, 10, 10, 2, "strip"),
        update(10, 150, 10, 3, "strip"),
        info("strip"),
    ]))
    .unwrap();
    assert_eq!(it.console().lines[2], "||SILVER||MAROON||MAROON");
}

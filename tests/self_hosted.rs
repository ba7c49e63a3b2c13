//! speclet's own suites, run through the speclet runner.
//!
//! This target uses `harness = false`, so `cargo test` invokes `main` directly and the command line
//! (filters, `-v`, `--format json`) goes to the speclet CLI.

use speclet::{
    Registry, attrs, bindings, describe, do_it, expect_eq, expr, given, it, stmt, sym, testing, using, using_once,
};

fn arithmetic(registry: &mut Registry) {
    describe!(registry, sym("arithmetic"), "integer operations",
        it!("adds", expr!(1 + 1 == 2)),
        it!("multiplies", expr!(3 * 4 == 12)),
        testing!("division",
            it!("truncates toward zero", expr!(-7 / 2 == -3)),
            it!("has a remainder", expr!(-7 % 2 == -1)),
        ),
        it!("checks overflow"),
    );
}

fn fixtures(registry: &mut Registry) {
    describe!(registry, "fixtures",
        using!(bindings!(|ctx| x = 1_i64, y = *ctx.get::<i64>("x")? + 1),
            it!("sees earlier bindings", expr!(|ctx| *ctx.get::<i64>("y")? == 2)),
            using!(bindings!(x = 10_i64),
                it!("shadows outer names", expr!(|ctx| *ctx.get::<i64>("x")? == 10)),
            ),
        ),
        using_once!(bindings!(words = vec!["a", "b", "c"]),
            do_it!("shares one value",
                stmt!(|ctx| expect_eq(ctx.get::<Vec<&'static str>>("words")?.len(), 3)),
                stmt!(|ctx| expect_eq(ctx.get::<Vec<&'static str>>("words")?[0], "a")),
            ),
        ),
        given!(bindings!(n = 5_i32), |ctx| {
            let n = *ctx.get::<i32>("n")?;
            vec![
                it!("captures the given value", expr!(n == 5)),
                it!("can compute with it", expr!(n * 2 == 10)),
            ]
        }),
    );
}

fn metadata(registry: &mut Registry) {
    describe!(registry, "metadata",
        attrs!(tier = "unit"),
        it!("explicit pending wins", attrs!(pending = "waits on a fixture server"), expr!(false)),
        it!("empty docs are fine", expr!(true)),
    );
}

fn main() {
    let mut registry = Registry::new();
    arithmetic(&mut registry);
    fixtures(&mut registry);
    metadata(&mut registry);
    speclet::cli::run(&registry);
}

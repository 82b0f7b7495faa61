#![no_main]

use alan_core::MachineConfig;
use alan_lang::{run_source, Diagnostics, RunOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&budget, rest)) = data.split_first() else {
        return;
    };
    let Ok(source) = std::str::from_utf8(rest) else {
        return;
    };

    let mut diagnostics = Diagnostics::with_capacity(usize::MAX);
    let ir = alan_lang::parser::parse(source, &mut diagnostics);
    let program = alan_lang::lower::lower(&ir);
    assert_eq!(program.configurations.len(), ir.configurations.len());

    let options = RunOptions {
        iterations: usize::from(budget),
        machine: MachineConfig {
            tape_capacity: 64,
            tracing_enabled: false,
        },
        diagnostic_capacity: 16,
    };
    let report = run_source(source, &options);
    assert!(report.diagnostics.len() <= 16);
    if let Some(result) = report.result {
        assert!((0.0..1.0).contains(&result.numeric));
    }
});

use authwatch::matcher::Matcher;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn benchmark_line_matching(c: &mut Criterion) {
    let matcher = Matcher::new();

    let test_lines = vec![
        "Mar 1 00:00:01 host sshd[123]: pam_unix(sshd:session): session opened for user root",
        "Mar 1 00:00:02 host sudo: alice : COMMAND=/bin/ls",
        "Mar 1 00:00:03 host CRON[456]: pam_unix(cron:session): session opened for user root",
        "Mar 1 00:00:04 host sshd[123]: Accepted publickey for bob from 10.0.0.5",
        "Mar 1 00:00:05 host sudo: alice : TTY=pts/0 ; PWD=/home/alice",
        "Mar 1 00:00:06 host systemd-logind[321]: New session 42 of user bob.",
    ];

    c.bench_function("line_matching", |b| {
        b.iter(|| {
            for line in &test_lines {
                black_box(matcher.match_line(line));
            }
        })
    });
}

fn benchmark_long_non_matching_line(c: &mut Criterion) {
    let matcher = Matcher::new();
    let line = "x".repeat(4096);

    c.bench_function("long_non_matching_line", |b| {
        b.iter(|| black_box(matcher.match_line(&line)))
    });
}

criterion_group!(benches, benchmark_line_matching, benchmark_long_non_matching_line);
criterion_main!(benches);

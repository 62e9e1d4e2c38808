use criterion::{black_box, criterion_group, criterion_main, Criterion};

use fsw_core::classify::{batch_is_relevant, ChangeRecord, NodeInterest, WatchedAttr};
use fsw_core::{plan_button, ButtonSnapshot, Fork};

fn bench_plan_button(c: &mut Criterion) {
    let stock = ButtonSnapshot {
        href: "vscode:extension/ms-python.python".to_string(),
        label: "Install".to_string(),
        marked: false,
    };
    let settled = ButtonSnapshot {
        href: "windsurf:extension/ms-python.python".to_string(),
        label: "Install on Windsurf".to_string(),
        marked: true,
    };

    c.bench_function("plan_button_stock", |b| {
        b.iter(|| plan_button(black_box(&stock), black_box(Fork::Windsurf)))
    });
    c.bench_function("plan_button_settled", |b| {
        b.iter(|| plan_button(black_box(&settled), black_box(Fork::Windsurf)))
    });
}

fn bench_classify(c: &mut Criterion) {
    // Typical framework churn: mostly noise, one interesting record.
    let batch: Vec<ChangeRecord> = (0..63)
        .map(|i| {
            if i % 2 == 0 {
                ChangeRecord::NodesChanged {
                    touches_button: false,
                }
            } else {
                ChangeRecord::AttributeChanged {
                    target: NodeInterest::Other,
                    attr: WatchedAttr::Class,
                    marker_present: false,
                }
            }
        })
        .chain(std::iter::once(ChangeRecord::AttributeChanged {
            target: NodeInterest::Link,
            attr: WatchedAttr::Href,
            marker_present: true,
        }))
        .collect();

    c.bench_function("classify_batch_64", |b| {
        b.iter(|| batch_is_relevant(black_box(&batch)))
    });
}

criterion_group!(benches, bench_plan_button, bench_classify);
criterion_main!(benches);

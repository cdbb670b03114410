// benches/listing.rs
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use oc_scrape::clean::sanitize_records;
use oc_scrape::specs::{ListingSpec, listing, pagination};

fn synthetic_page(rows: usize) -> String {
    let body: String = (0..rows)
        .map(|i| {
            format!(
                "<tr><td><a href=\"/company/{i}\">公司{i}\n有限公司</a></td><td>岗位{i}</td><td>北京</td>\
                 <td>2025/10/{d}</td><td><a href=\"https://jobs.example.com/{i}\">查看</a></td></tr>",
                d = i % 28 + 1
            )
        })
        .collect();
    format!(
        "<html><body><table class=\"table\"><thead><tr><th>公司名称</th><th>岗位</th><th>地点</th>\
         <th>投递截止日期</th><th>招聘公告</th></tr></thead><tbody>{body}</tbody></table>\
         <ul class=\"pagination\"><li><a href=\"?page=1\">1</a></li><li><a href=\"?page=120\">120</a></li></ul>\
         </body></html>"
    )
}

fn bench_listing(c: &mut Criterion) {
    let spec = ListingSpec::default();
    let doc = synthetic_page(50);

    c.bench_function("extract_rows_50", |b| {
        b.iter(|| {
            let rows = listing::extract_rows(black_box(&doc), &spec).unwrap_or_default();
            black_box(rows.len())
        })
    });

    c.bench_function("extract_and_sanitize_50", |b| {
        b.iter(|| {
            let rows = listing::extract_rows(black_box(&doc), &spec).unwrap_or_default();
            black_box(sanitize_records(rows).len())
        })
    });

    c.bench_function("detect_total_pages", |b| {
        b.iter(|| black_box(pagination::detect_total_pages(black_box(&doc), &spec)))
    });
}

criterion_group!(benches, bench_listing);
criterion_main!(benches);

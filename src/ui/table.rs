use tabled::{Table, Tabled, settings::Style};

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Count")]
    count: usize,
}

/// Two-column table of names and counts, e.g. nodes per label
pub struct CountTable {
    rows: Vec<CountRow>,
}

impl CountTable {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, count: usize) {
        self.rows.push(CountRow {
            label: label.to_string(),
            count,
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for CountTable {
    fn default() -> Self {
        Self::new()
    }
}

pub fn count_table(counts: &[(String, usize)]) -> String {
    let mut table = CountTable::new();
    for (label, count) in counts {
        table.add_row(label, *count);
    }
    table.build()
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let rows: Vec<MetricRow> = stats
        .iter()
        .map(|(metric, value)| MetricRow {
            metric: metric.to_string(),
            value: value.to_string(),
        })
        .collect();
    if rows.is_empty() {
        return String::new();
    }
    Table::new(&rows).with(Style::rounded()).to_string()
}

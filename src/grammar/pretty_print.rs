use std::collections::HashSet;

use crowbook_text_processing::escape;
use serde::Serialize;

use super::{
    first_follow::{FirstSets, FollowSets},
    grammar::EPSILON_INDEX,
    ll1_table::LL1Table,
    lr0::{Automaton, LR0Item},
    slr1_table::{Action, SLR1Table},
    trace::{ParseOutcome, RejectReason, StepAction},
    Grammar, EPSILON,
};

/// Right-aligns every column and joins cells with `|`.
fn to_aligned_table(output: &[Vec<String>]) -> String {
    let columns = output.iter().map(|line| line.len()).max().unwrap_or(0);
    let width: Vec<usize> = (0..columns)
        .map(|j| {
            output
                .iter()
                .filter_map(|line| line.get(j))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    output
        .iter()
        .map(|line| {
            line.iter()
                .enumerate()
                .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn tex_symbols(symbols: &[&str], terminal_set: &HashSet<&str>) -> String {
    symbols
        .iter()
        .map(|s| {
            if terminal_set.contains(s) {
                format!("\\text{{{}}}", escape::tex(*s))
            } else {
                escape::tex(*s).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" \\  ")
        .replace(EPSILON, "\\epsilon")
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub left: &'a str,
    pub rights: Vec<Vec<&'a str>>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        self.rights
            .iter()
            .map(|right| right.join(" "))
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{:>width$} -> {}", self.left, right, width = left_width)
                } else if multiline {
                    format!("{:>width$}  | {}", "", right, width = left_width)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool, terminal_set: &HashSet<&str>) -> String {
        if self.rights.is_empty() {
            return String::new();
        }

        let left = if and_sign {
            format!("{} & \\rightarrow &", escape::tex(self.left))
        } else {
            format!("{} \\rightarrow ", escape::tex(self.left))
        };
        let right = self
            .rights
            .iter()
            .map(|right| tex_symbols(right, terminal_set))
            .collect::<Vec<_>>()
            .join(" \\mid ");

        left + &right
    }
}

#[derive(Debug, Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
    #[serde(skip)]
    terminals: HashSet<&'a str>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.chars().count())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len, true))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(self.productions.iter().map(|s| s.to_latex(true, &self.terminals)))
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    fn terminal_name_set(&self) -> HashSet<&str> {
        self.lookahead_iter()
            .map(|idx| self.get_symbol_name(idx))
            .collect()
    }

    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let productions = self
            .non_terminal_iter()
            .map(|nt| ProductionOutput {
                left: nt.name.as_str(),
                rights: nt
                    .productions
                    .iter()
                    .map(|p| self.production_to_vec_str(p))
                    .collect(),
            })
            .collect();
        ProductionOutputVec {
            productions,
            terminals: self.terminal_name_set(),
        }
    }
}

#[derive(Serialize)]
struct NonTerminalOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<&'a str>,
    follow: Vec<&'a str>,
}

impl NonTerminalOutput<'_> {
    fn to_plaintext(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.name,
            self.nullable,
            self.first.join(", "),
            self.follow.join(", ")
        )
    }

    fn to_latex(&self) -> String {
        fn f(a: &[&str]) -> String {
            a.iter()
                .map(|s| escape::tex(*s))
                .collect::<Vec<_>>()
                .join(r"\ ")
                .replace(EPSILON, r"$\epsilon$")
        }

        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name),
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Serialize)]
pub struct NonTerminalOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
}

impl NonTerminalOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| s.to_plaintext())
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl Grammar {
    pub fn to_non_terminal_output_vec(
        &self,
        first: &FirstSets,
        follow: &FollowSets,
    ) -> NonTerminalOutputVec {
        let mut data = Vec::new();
        for nt in self.non_terminal_iter() {
            let mut t = NonTerminalOutput {
                name: nt.name.as_str(),
                nullable: first.is_nullable(nt.index),
                first: first
                    .get(nt.index)
                    .iter()
                    .filter(|&&idx| idx != EPSILON_INDEX)
                    .map(|idx| self.get_symbol_name(*idx))
                    .collect(),
                follow: follow
                    .get(nt.index)
                    .iter()
                    .map(|idx| self.get_symbol_name(*idx))
                    .collect(),
            };
            t.first.sort();
            t.follow.sort();

            if t.nullable {
                t.first.push(EPSILON);
            }
            data.push(t);
        }
        NonTerminalOutputVec { data }
    }
}

#[derive(Serialize)]
pub struct LL1ParsingTable<'a> {
    terminals: Vec<&'a str>,
    rows: Vec<(&'a str, Vec<ProductionOutput<'a>>)>,
    conflicts: Vec<String>,
}

impl LL1ParsingTable<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|&t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend(
                row.iter()
                    .map(|productions| productions.to_plaintext(left.chars().count(), false)),
            );
            output.push(line);
        }

        let mut table = to_aligned_table(&output);
        for conflict in &self.conflicts {
            table.push_str("\nconflict: ");
            table.push_str(conflict);
        }
        table
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|&t| format!("\\text{{{}}}", escape::tex(t))),
        );
        let header = header.join(" & ");

        let mut output: Vec<String> = Vec::new();
        let terminal_set: HashSet<&str> = self.terminals.iter().cloned().collect();
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![escape::tex(*left).to_string()];
            line.extend(row.iter().map(|productions| {
                let cell = productions.to_latex(false, &terminal_set);
                if productions.rights.len() > 1 {
                    format!("{{\\color{{red}}{}}}", cell)
                } else {
                    cell
                }
            }));
            output.push(line.join(" & "));
        }

        let output = output.join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }
}

impl Grammar {
    /// Table cells list the kept production first, then every production
    /// that lost the cell to it.
    pub fn to_ll1_parsing_table<'a>(&'a self, table: &LL1Table) -> LL1ParsingTable<'a> {
        let columns: Vec<usize> = self.lookahead_iter().collect();
        let terminals: Vec<&str> = columns.iter().map(|&t| self.get_symbol_name(t)).collect();

        let mut rows: Vec<(&str, Vec<ProductionOutput>)> = Vec::new();
        for nt in self.non_terminal_iter() {
            let left = nt.name.as_str();
            let row = columns
                .iter()
                .map(|&t| {
                    let mut rights = Vec::new();
                    if let Some(alt) = table.get(nt.index, t) {
                        rights.push(self.production_to_vec_str(&nt.productions[alt]));
                    }
                    for c in table
                        .conflicts()
                        .iter()
                        .filter(|c| c.non_terminal == nt.index && c.terminal == t)
                    {
                        rights.push(self.production_to_vec_str(&nt.productions[c.rejected]));
                    }
                    ProductionOutput { left, rights }
                })
                .collect();
            rows.push((left, row));
        }

        let conflicts = table
            .conflicts()
            .iter()
            .map(|c| {
                let productions = self.productions(c.non_terminal);
                format!(
                    "M[{}, {}]: {} -> {} vs {} -> {}",
                    self.get_symbol_name(c.non_terminal),
                    self.get_symbol_name(c.terminal),
                    self.get_symbol_name(c.non_terminal),
                    self.production_to_string(&productions[c.kept]),
                    self.get_symbol_name(c.non_terminal),
                    self.production_to_string(&productions[c.rejected]),
                )
            })
            .collect();

        LL1ParsingTable {
            terminals,
            rows,
            conflicts,
        }
    }
}

#[derive(Serialize)]
pub struct LRStateOutput {
    kernel: Vec<String>,
    extend: Vec<String>,
    edges: Vec<(String, usize)>,
}

impl LRStateOutput {
    pub fn to_plaintext(&self) -> String {
        let kernel = self.kernel.join("\n");

        let extend = if !self.extend.is_empty() {
            format!("\n---\n{}", self.extend.join("\n"))
        } else {
            String::new()
        };

        let edges = if !self.edges.is_empty() {
            format!(
                "\n===\n{}",
                self.edges
                    .iter()
                    .map(|(k, v)| format!("- {} -> {}", k, v))
                    .collect::<Vec<_>>()
                    .join("\n")
            )
        } else {
            String::new()
        };

        format!("{}{}{}", kernel, extend, edges)
    }

    fn node_to_latex(&self, id: usize) -> String {
        let content = self
            .kernel
            .iter()
            .chain(self.extend.iter())
            .map(|e| format!("${}$", escape::tex(e.as_str()).replace("->", "\\rightarrow")))
            .collect::<Vec<_>>()
            .join(" \\\\ \n");
        format!(
            "\\node [block] (I_{}){}\n{{\n$I_{}$\\\\\n{}\n}};",
            id,
            if id > 0 {
                if id % 2 == 0 {
                    format!(" [below of = I_{}] ", id - 2)
                } else {
                    format!(" [right of = I_{}] ", id - 1)
                }
            } else {
                String::new()
            },
            id,
            content
        )
    }

    fn edge_to_latex(&self, id: usize) -> String {
        self.edges
            .iter()
            .map(|(e, v)| {
                format!(
                    "\\path [->] (I_{}) edge {} node [above]{{{}}} (I_{});",
                    id,
                    if id == *v { "[loop left]" } else { "[right]" },
                    escape::tex(e.as_str()),
                    v
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Serialize)]
pub struct LRFSMOutput {
    states: Vec<LRStateOutput>,
}

impl LRFSMOutput {
    pub fn to_plaintext(&self) -> String {
        self.states
            .iter()
            .enumerate()
            .map(|(i, s)| format!("I{}\n{}", i, s.to_plaintext()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn to_latex(&self) -> String {
        format!(
            "\\begin{{tikzpicture}}[node distance=5cm,block/.style={{state, rectangle, text width=6em}}]\n{}\n\\end{{tikzpicture}}",
            self.states
                .iter()
                .enumerate()
                .map(|(i, s)| s.node_to_latex(i))
                .chain(self.states.iter().enumerate().map(|(i, s)| s.edge_to_latex(i)))
                .collect::<Vec<_>>()
                .join("\n")
        )
    }
}

impl Automaton {
    pub fn item_to_plaintext(&self, g: &Grammar, item: &LR0Item) -> String {
        let mut output = String::new();
        output.push_str(self.symbol_name(g, item.left));
        output.push_str(" ->");
        for (i, s) in item.right.iter().enumerate() {
            output.push(' ');
            if i == item.position {
                output.push('.');
            }
            output.push_str(g.get_symbol_name(*s));
        }
        if item.is_complete() {
            output.push_str(" .");
        }
        output
    }

    pub fn to_output(&self, g: &Grammar) -> LRFSMOutput {
        let states = self
            .states
            .iter()
            .enumerate()
            .map(|(i, state)| LRStateOutput {
                kernel: state
                    .kernel(self.augmented_start)
                    .map(|item| self.item_to_plaintext(g, item))
                    .collect(),
                extend: state
                    .extend(self.augmented_start)
                    .map(|item| self.item_to_plaintext(g, item))
                    .collect(),
                edges: self
                    .edges(i)
                    .map(|(symbol, target)| (g.get_symbol_name(symbol).to_string(), target))
                    .collect(),
            })
            .collect();
        LRFSMOutput { states }
    }
}

impl Action {
    pub fn to_plaintext(&self, g: &Grammar) -> String {
        match self {
            Action::Reduce { left, right } => {
                format!("r({} -> {})", g.get_symbol_name(*left), g.production_to_string(right))
            }
            Action::Shift(s) => format!("s{}", s),
            Action::Accept => "acc".to_string(),
        }
    }

    pub fn to_latex(&self, g: &Grammar, terminal_set: &HashSet<&str>) -> String {
        match self {
            Action::Reduce { left, right } => format!(
                "reduce ${} \\rightarrow {}$",
                escape::tex(g.get_symbol_name(*left)),
                tex_symbols(&g.production_to_vec_str(right), terminal_set)
            ),
            Action::Shift(s) => format!("shift {}", s),
            Action::Accept => "accept".to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct LRParsingTable {
    terminals: Vec<String>,
    non_terminals: Vec<String>,
    /// Per state and terminal: the kept action first, then rejected ones.
    action: Vec<Vec<Vec<String>>>,
    #[serde(skip)]
    action_latex: Vec<Vec<Vec<String>>>,
    goto: Vec<Vec<Option<usize>>>,
    conflicts: Vec<String>,
}

impl LRParsingTable {
    pub fn to_plaintext(&self) -> String {
        let mut output: Vec<Vec<String>> = Vec::new();

        output.push(vec![String::new()]);
        for s in self.terminals.iter().chain(self.non_terminals.iter()) {
            output[0].push(s.clone());
        }

        for (i, (r1, r2)) in self.action.iter().zip(self.goto.iter()).enumerate() {
            let row: Vec<String> = std::iter::once(i.to_string())
                .chain(r1.iter().map(|actions| actions.join("; ")))
                .chain(r2.iter().map(|goto| goto.map(|g| g.to_string()).unwrap_or_default()))
                .collect();
            output.push(row);
        }

        let mut table = to_aligned_table(&output);
        for conflict in &self.conflicts {
            table.push_str("\nconflict: ");
            table.push_str(conflict);
        }
        table
    }

    pub fn to_latex(&self) -> String {
        let header: String = format!(
            "\\begin{{tabular}}{{c{}}}\n & \\multicolumn{{{}}}{{c}}{{action}} & \\multicolumn{{{}}}{{|c}}{{goto}}\\\\",
            "|l".repeat(self.terminals.len() + self.non_terminals.len()),
            self.terminals.len(),
            self.non_terminals.len(),
        );

        let first_row = std::iter::once(String::new())
            .chain(
                self.terminals
                    .iter()
                    .chain(self.non_terminals.iter())
                    .map(|s| escape::tex(s.as_str()).to_string()),
            )
            .collect::<Vec<_>>()
            .join(" & ");

        let content = self
            .action_latex
            .iter()
            .zip(self.goto.iter())
            .enumerate()
            .map(|(i, (r1, r2))| {
                std::iter::once(i.to_string())
                    .chain(r1.iter().map(|actions| {
                        let r = actions.join("; ");
                        if actions.len() > 1 {
                            format!("{{\\color{{red}}{}}}", r)
                        } else {
                            r
                        }
                    }))
                    .chain(r2.iter().map(|goto| goto.map(|g| g.to_string()).unwrap_or_default()))
                    .collect::<Vec<_>>()
                    .join(" & ")
            })
            .collect::<Vec<_>>()
            .join(" \\\\\n");

        format!(
            "{}\n{} \\\\\\hline\n{}\n\\end{{tabular}}",
            header, first_row, content
        )
    }
}

impl SLR1Table {
    pub fn to_output(&self, g: &Grammar) -> LRParsingTable {
        let columns: Vec<usize> = g.lookahead_iter().collect();
        let non_terminals: Vec<usize> = g.non_terminal_iter().map(|nt| nt.index).collect();
        let terminal_set = g.terminal_name_set();

        let cell = |state: usize, t: usize| {
            self.action(state, t)
                .into_iter()
                .chain(
                    self.conflicts()
                        .iter()
                        .filter(move |c| c.state == state && c.symbol == t)
                        .map(|c| &c.rejected),
                )
                .collect::<Vec<_>>()
        };

        let action: Vec<Vec<Vec<String>>> = (0..self.state_count())
            .map(|i| {
                columns
                    .iter()
                    .map(|&t| cell(i, t).iter().map(|a| a.to_plaintext(g)).collect())
                    .collect()
            })
            .collect();
        let action_latex: Vec<Vec<Vec<String>>> = (0..self.state_count())
            .map(|i| {
                columns
                    .iter()
                    .map(|&t| {
                        cell(i, t)
                            .iter()
                            .map(|a| a.to_latex(g, &terminal_set))
                            .collect()
                    })
                    .collect()
            })
            .collect();
        let goto: Vec<Vec<Option<usize>>> = (0..self.state_count())
            .map(|i| non_terminals.iter().map(|&nt| self.goto(i, nt)).collect())
            .collect();

        let conflicts = self
            .conflicts()
            .iter()
            .map(|c| {
                format!(
                    "state {}, {}: {} vs {}",
                    c.state,
                    g.get_symbol_name(c.symbol),
                    c.kept.to_plaintext(g),
                    c.rejected.to_plaintext(g)
                )
            })
            .collect();

        LRParsingTable {
            terminals: columns
                .iter()
                .map(|&t| g.get_symbol_name(t).to_string())
                .collect(),
            non_terminals: non_terminals
                .iter()
                .map(|&nt| g.get_symbol_name(nt).to_string())
                .collect(),
            action,
            action_latex,
            goto,
            conflicts,
        }
    }
}

#[derive(Serialize)]
struct TraceRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    states: Option<String>,
    stack: String,
    input: String,
    action: String,
}

#[derive(Serialize)]
pub struct TraceOutput {
    accepted: bool,
    rows: Vec<TraceRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reductions: Vec<String>,
}

impl TraceOutput {
    pub fn to_plaintext(&self) -> String {
        let with_states = self.rows.iter().any(|r| r.states.is_some());
        let mut output: Vec<Vec<String>> = Vec::new();
        let mut header = Vec::new();
        if with_states {
            header.push("States".to_string());
        }
        header.extend(["Stack", "Input", "Action"].iter().map(|s| s.to_string()));
        output.push(header);

        for row in &self.rows {
            let mut line = Vec::new();
            if with_states {
                line.push(row.states.clone().unwrap_or_default());
            }
            line.push(row.stack.clone());
            line.push(row.input.clone());
            line.push(row.action.clone());
            output.push(line);
        }

        let verdict = if self.accepted { "yes" } else { "no" };
        format!("{}\n{}", to_aligned_table(&output), verdict)
    }

    pub fn to_latex(&self) -> String {
        let with_states = self.rows.iter().any(|r| r.states.is_some());
        let columns = if with_states { 4 } else { 3 };
        let header = if with_states {
            "States & Stack & Input & Action"
        } else {
            "Stack & Input & Action"
        };

        let content = self
            .rows
            .iter()
            .map(|row| {
                row.states
                    .iter()
                    .chain([&row.stack, &row.input, &row.action])
                    .map(|s| escape::tex(s.as_str()).replace(EPSILON, "$\\epsilon$"))
                    .collect::<Vec<_>>()
                    .join(" & ")
            })
            .collect::<Vec<_>>()
            .join("\\\\\n");

        format!(
            "\\begin{{tabular}}{{{}}}\n{}\\\\\\hline\n{}\\\\\n\\end{{tabular}}",
            vec!["l"; columns].join("|"),
            header,
            content
        )
    }
}

impl Grammar {
    fn symbols_to_string(&self, symbols: &[usize]) -> String {
        symbols
            .iter()
            .map(|&s| self.get_symbol_name(s))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn step_action_to_string(&self, action: &StepAction, shift_reduce: bool) -> String {
        match action {
            StepAction::Match(t) => format!("match {}", self.get_symbol_name(*t)),
            StepAction::Derive { left, right } => format!(
                "{} -> {}",
                self.get_symbol_name(*left),
                self.production_to_string(right)
            ),
            StepAction::Shift(s) => format!("shift {}", s),
            StepAction::Reduce { left, right } => format!(
                "reduce {} -> {}",
                self.get_symbol_name(*left),
                self.production_to_string(right)
            ),
            StepAction::Accept => "accept".to_string(),
            StepAction::Reject(reason) => match reason {
                RejectReason::Mismatch { expected, found } => format!(
                    "reject: expected {}, found {}",
                    self.get_symbol_name(*expected),
                    self.get_symbol_name(*found)
                ),
                RejectReason::NoEntry { top, lookahead } => {
                    let top = if shift_reduce {
                        format!("state {}", top)
                    } else {
                        self.get_symbol_name(*top).to_string()
                    };
                    format!(
                        "reject: no entry for {} on {}",
                        top,
                        self.get_symbol_name(*lookahead)
                    )
                }
                RejectReason::NoGoto {
                    state,
                    non_terminal,
                } => format!(
                    "reject: no goto from state {} on {}",
                    state,
                    self.get_symbol_name(*non_terminal)
                ),
                RejectReason::UnknownToken { position } => {
                    format!("reject: unknown token at {}", position)
                }
                RejectReason::StepLimit(limit) => format!("reject: more than {} steps", limit),
            },
        }
    }

    pub fn to_trace_output(&self, outcome: &ParseOutcome) -> TraceOutput {
        let shift_reduce = outcome
            .steps
            .iter()
            .any(|s| !s.states.is_empty());
        let rows = outcome
            .steps
            .iter()
            .map(|step| TraceRow {
                states: shift_reduce.then(|| {
                    step.states
                        .iter()
                        .map(|s| s.to_string())
                        .collect::<Vec<_>>()
                        .join(" ")
                }),
                stack: self.symbols_to_string(&step.stack),
                input: self.symbols_to_string(&step.input),
                action: self.step_action_to_string(&step.action, shift_reduce),
            })
            .collect();
        let reductions = outcome
            .reductions
            .iter()
            .map(|(left, right)| {
                format!(
                    "{} -> {}",
                    self.get_symbol_name(*left),
                    self.production_to_string(right)
                )
            })
            .collect();

        TraceOutput {
            accepted: outcome.accepted,
            rows,
            reductions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{
        analysis::{Analysis, AnalysisConfig, ParserKind},
        first_follow::tests::{G1, G2},
    };

    #[test]
    fn productions_plaintext() {
        let g = Grammar::parse("S -> a S | ε\nAB -> b").unwrap();
        assert_eq!(
            g.to_production_output_vec().to_plaintext(),
            " S -> a S\n    | ε\nAB -> b"
        );
    }

    #[test]
    fn first_follow_plaintext_and_json() {
        let g = Grammar::parse(G1).unwrap();
        let first = g.compute_first_sets();
        let follow = g.compute_follow_sets(&first);
        let t = g.to_non_terminal_output_vec(&first, &follow);

        let text = t.to_plaintext();
        assert_eq!(text.lines().next(), Some("E | false | (, id | $, )"));
        assert!(text.contains("E' | true | +, ε | $, )"));

        let json: serde_json::Value = serde_json::from_str(&t.to_json().unwrap()).unwrap();
        assert_eq!(json["data"][1]["name"], "E'");
        assert_eq!(json["data"][1]["nullable"], true);
    }

    #[test]
    fn ll1_table_lists_conflicts() {
        let g = Grammar::parse("S -> a b | a c").unwrap();
        let first = g.compute_first_sets();
        let follow = g.compute_follow_sets(&first);
        let table = g.build_ll1_table(&first, &follow);
        let text = g.to_ll1_parsing_table(&table).to_plaintext();

        assert!(text.contains("S -> a b | a c"));
        assert!(text.ends_with("conflict: M[S, a]: S -> a b vs S -> a c"));
        assert!(g.to_ll1_parsing_table(&table).to_latex().contains("\\color{red}"));
    }

    #[test]
    fn automaton_plaintext() {
        let g = Grammar::parse(G2).unwrap();
        let fsm = g.build_automaton().unwrap();
        let text = fsm.to_output(&g).to_plaintext();

        assert!(text.starts_with("I0\nE' -> .E\n---\n"));
        assert!(text.contains("F -> id ."));
        assert!(fsm.to_output(&g).to_latex().contains("\\node [block] (I_11)"));
    }

    #[test]
    fn slr1_table_plaintext() {
        let g = Grammar::parse(G2).unwrap();
        let analysis = Analysis::new(&g, AnalysisConfig::default()).unwrap();
        let t = analysis.slr1_table.to_output(&g);
        let text = t.to_plaintext();

        assert_eq!(text.lines().count(), 13);
        assert!(text.contains("acc"));
        assert!(text.contains("r(F -> id)"));
        assert!(!text.contains("conflict"));

        let json: serde_json::Value = serde_json::to_value(&t).unwrap();
        assert_eq!(json["terminals"].as_array().map(|a| a.len()), Some(6));
        assert!(json.get("action_latex").is_none());
    }

    #[test]
    fn trace_plaintext() {
        let g = Grammar::parse(G2).unwrap();
        let analysis = Analysis::new(&g, AnalysisConfig::default()).unwrap();

        let outcome = analysis.parse_str(ParserKind::ShiftReduce, "id");
        let trace = g.to_trace_output(&outcome);
        let text = trace.to_plaintext();
        assert!(text.trim_start().starts_with("States"));
        assert!(text.contains("reduce F -> id"));
        assert!(text.ends_with("yes"));
        assert!(trace.to_latex().starts_with("\\begin{tabular}{l|l|l|l}"));

        let g1 = Grammar::parse(G1).unwrap();
        let a1 = Analysis::new(&g1, AnalysisConfig::default()).unwrap();
        let outcome = a1.parse_str(ParserKind::Predictive, "id+");
        let text = g1.to_trace_output(&outcome).to_plaintext();
        assert!(text.trim_start().starts_with("Stack"));
        assert!(text.contains("reject: no entry for T on $"));
        assert!(text.ends_with("no"));
    }
}

//! Built-in recursion examples and driver synthesis
//!
//! Each [`Preset`] carries sample source whose last section, after a
//! `// Driver` marker, calls the root function. [`Preset::program`] swaps
//! that section for one synthesized from a user-supplied input literal, so
//! the same function can be traced on different inputs.

use serde::Serialize;
use std::fmt::Write as _;

/// Marker separating the definitions from the calling statements
pub const DRIVER_MARKER: &str = "// Driver";

/// How an input literal becomes driver declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputShape {
    /// `5` → `int n = 5;`
    Number,
    /// `1, 2, 3` → `vector<int> arr = {1, 2, 3};`
    Array,
    /// `"hello"` or `hello` → `string s = "hello";`
    Str,
    /// `2, 1` → one `int` per parameter, missing parts default to 0
    MultiNumber,
    /// Input is ignored; the source runs as written
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub id: &'static str,
    pub name: &'static str,
    pub shape: InputShape,
    pub default_input: &'static str,
    /// Names given to the input values, in call order
    pub params: &'static [&'static str],
    /// Literal arguments appended after the parameters
    pub extra_args: &'static [&'static str],
    /// Extra declarations emitted between the inputs and the call
    pub setup: &'static [&'static str],
    pub root_fn: &'static str,
    pub code: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub presets: &'static [Preset],
}

impl Preset {
    /// Calling statements for `input`; `None` for presets that take no input
    pub fn driver(&self, input: &str) -> Option<String> {
        let input = input.trim();
        let mut driver = String::new();

        match self.shape {
            InputShape::None => return None,
            InputShape::Array => {
                let name = self.params.first().copied().unwrap_or("arr");
                let _ = writeln!(driver, "vector<int> {} = {{{}}};", name, input);
                if self.params.get(1) == Some(&"n") {
                    let _ = writeln!(driver, "int n = {}.size();", name);
                }
            }
            InputShape::Number => {
                let name = self.params.first().copied().unwrap_or("n");
                let _ = writeln!(driver, "int {} = {};", name, input);
            }
            InputShape::Str => {
                let name = self.params.first().copied().unwrap_or("s");
                let text = input
                    .strip_prefix('"')
                    .and_then(|s| s.strip_suffix('"'))
                    .unwrap_or(input);
                let _ = writeln!(driver, "string {} = \"{}\";", name, text);
            }
            InputShape::MultiNumber => {
                let mut parts = input.split(',').map(str::trim);
                for name in self.params {
                    let part = parts.next().filter(|p| !p.is_empty()).unwrap_or("0");
                    let _ = writeln!(driver, "int {} = {};", name, part);
                }
            }
        }

        for line in self.setup {
            let _ = writeln!(driver, "{}", line);
        }

        let args: Vec<&str> = self
            .params
            .iter()
            .chain(self.extra_args.iter())
            .copied()
            .collect();
        let _ = write!(driver, "{}({});", self.root_fn, args.join(", "));
        Some(driver)
    }

    /// The preset's source with its driver rebuilt from `input`
    pub fn program(&self, input: &str) -> String {
        match self.driver(input) {
            Some(driver) => with_driver(self.code, &driver),
            None => self.code.to_string(),
        }
    }

    /// The preset's source run on its default input
    pub fn default_program(&self) -> String {
        self.program(self.default_input)
    }
}

/// Replace everything from the driver marker on with `driver`, or append
/// a marked driver section when the source has none.
pub fn with_driver(source: &str, driver: &str) -> String {
    match source.split_once(DRIVER_MARKER) {
        Some((head, _)) => format!("{}\n{}\n{}", head, DRIVER_MARKER, driver),
        None => format!("{}\n\n{}\n{}", source, DRIVER_MARKER, driver),
    }
}

/// Every built-in preset, grouped by kind of recursion
pub fn catalog() -> &'static [Category] {
    CATALOG
}

/// Look a preset up by id (`factorial`) or `category:id` (`linear:factorial`)
pub fn find(id: &str) -> Option<&'static Preset> {
    let (category, id) = match id.split_once(':') {
        Some((category, id)) => (Some(category), id),
        None => (None, id),
    };
    CATALOG
        .iter()
        .filter(|c| category.is_none_or(|wanted| c.id == wanted))
        .flat_map(|c| c.presets.iter())
        .find(|p| p.id == id)
}

/// All presets in catalog order, with their category id
pub fn all() -> impl Iterator<Item = (&'static str, &'static Preset)> {
    CATALOG
        .iter()
        .flat_map(|c| c.presets.iter().map(move |p| (c.id, p)))
}

static CATALOG: &[Category] = &[
    Category {
        id: "linear",
        name: "Linear Recursion",
        description: "A function makes exactly one recursive call. The stack grows linearly with input size.",
        presets: &[
            Preset {
                id: "factorial",
                name: "Factorial",
                shape: InputShape::Number,
                default_input: "5",
                params: &["n"],
                extra_args: &[],
                setup: &[],
                root_fn: "factorial",
                code: r#"int factorial(int n) {
    if (n <= 1) return 1;
    return n * factorial(n - 1);
}

// Driver
int n = 5;
factorial(n);"#,
            },
            Preset {
                id: "sum_array",
                name: "Sum of Array",
                shape: InputShape::Array,
                default_input: "1, 2, 3, 4, 5",
                params: &["arr", "n"],
                extra_args: &[],
                setup: &[],
                root_fn: "sumArray",
                code: r#"int sumArray(vector<int> arr, int n) {
    if (n <= 0) return 0;
    return sumArray(arr, n - 1) + arr[n - 1];
}

// Driver
vector<int> arr = {1, 2, 3, 4, 5};
sumArray(arr, arr.size());"#,
            },
            Preset {
                id: "reverse_string",
                name: "Reverse String",
                shape: InputShape::Str,
                default_input: "\"hello\"",
                params: &["s"],
                extra_args: &[],
                setup: &[],
                root_fn: "reverseString",
                code: r#"string reverseString(string s) {
    if (s.length() == 0) return "";
    return reverseString(s.substr(1)) + s[0];
}

// Driver
string s = "hello";
reverseString(s);"#,
            },
        ],
    },
    Category {
        id: "tree",
        name: "Tree Recursion",
        description: "A function makes multiple recursive calls. The execution visualizes as a branching tree.",
        presets: &[
            Preset {
                id: "fibonacci",
                name: "Fibonacci Number",
                shape: InputShape::Number,
                default_input: "5",
                params: &["n"],
                extra_args: &[],
                setup: &[],
                root_fn: "fib",
                code: r#"int fib(int n) {
    if (n <= 1) return n;
    return fib(n - 1) + fib(n - 2);
}

// Driver
int n = 5;
fib(n);"#,
            },
            Preset {
                id: "merge_sort",
                name: "Merge Sort (Divide & Conquer)",
                shape: InputShape::Array,
                default_input: "38, 27, 43, 3, 9, 82, 10",
                params: &["arr"],
                extra_args: &["0", "arr.size() - 1"],
                setup: &[],
                root_fn: "mergeSort",
                code: r#"void merge(vector<int>& arr, int l, int m, int r) {
    // Merge logic simplified for visualization focus
    // In actual C++, this would be complex.
    // Here we focus on the call structure.
}

void mergeSort(vector<int>& arr, int l, int r) {
    if (l >= r) return;
    int m = l + (r - l) / 2;
    mergeSort(arr, l, m);
    mergeSort(arr, m + 1, r);
    merge(arr, l, m, r);
}

// Driver
vector<int> arr = {38, 27, 43, 3, 9, 82, 10};
mergeSort(arr, 0, arr.size() - 1);"#,
            },
        ],
    },
    Category {
        id: "backtracking",
        name: "Backtracking",
        description: "Explores all potential solutions by building candidates and abandoning valid ones (backtracking).",
        presets: &[
            Preset {
                id: "permutations",
                name: "Permutations",
                shape: InputShape::Array,
                default_input: "1, 2, 3",
                params: &["nums"],
                extra_args: &["{}", "visited"],
                setup: &["vector<bool> visited(nums.size(), false);"],
                root_fn: "permute",
                code: r#"void permute(vector<int> nums, vector<int> curr, vector<bool> visited) {
    if (curr.size() == nums.size()) {
        cout << "Found: " << curr;
        return;
    }

    for (int i = 0; i < nums.size(); i++) {
        if (visited[i]) continue;

        visited[i] = true;
        curr.push_back(nums[i]);

        permute(nums, curr, visited);

        visited[i] = false;
        curr.pop_back();
    }
}

// Driver
vector<int> nums = {1, 2, 3};
vector<bool> visited = {false, false, false};
permute(nums, {}, visited);"#,
            },
            Preset {
                id: "subsets",
                name: "Subsets",
                shape: InputShape::Array,
                default_input: "1, 2, 3",
                params: &["nums"],
                extra_args: &["{}", "0"],
                setup: &[],
                root_fn: "subsets",
                code: r#"void subsets(vector<int> nums, vector<int> curr, int index) {
    cout << "Subset: " << curr;

    for (int i = index; i < nums.size(); i++) {
        curr.push_back(nums[i]);
        subsets(nums, curr, i + 1);
        curr.pop_back();
    }
}

// Driver
vector<int> nums = {1, 2, 3};
subsets(nums, {}, 0);"#,
            },
        ],
    },
    Category {
        id: "tail",
        name: "Tail Recursion",
        description: "The recursive call is the final action. Modern compilers can optimize this to a loop.",
        presets: &[Preset {
            id: "tail_factorial",
            name: "Tail Recursive Factorial",
            shape: InputShape::Number,
            default_input: "5",
            params: &["n"],
            extra_args: &["1"],
            setup: &[],
            root_fn: "tailFactorial",
            code: r#"int tailFactorial(int n, int accumulator) {
    if (n == 0) return accumulator;
    return tailFactorial(n - 1, n * accumulator);
}

// Driver
int n = 5;
tailFactorial(n, 1);"#,
        }],
    },
    Category {
        id: "indirect",
        name: "Indirect Recursion",
        description: "Functions call each other in a cycle (A calls B, B calls A).",
        presets: &[Preset {
            id: "even_odd",
            name: "Even / Odd",
            shape: InputShape::Number,
            default_input: "5",
            params: &["n"],
            extra_args: &[],
            setup: &[],
            root_fn: "isEven",
            code: r#"bool isEven(int n);
bool isOdd(int n);

bool isEven(int n) {
    if (n == 0) return true;
    return isOdd(n - 1);
}

bool isOdd(int n) {
    if (n == 0) return false;
    return isEven(n - 1);
}

// Driver
int n = 5;
isEven(n);"#,
        }],
    },
    Category {
        id: "nested",
        name: "Nested Recursion",
        description: "A recursive function passes a recursive call to itself as an argument.",
        presets: &[Preset {
            id: "ackermann",
            name: "Ackermann Function",
            shape: InputShape::MultiNumber,
            default_input: "2, 1",
            params: &["m", "n"],
            extra_args: &[],
            setup: &[],
            root_fn: "ackermann",
            code: r#"int ackermann(int m, int n) {
    if (m == 0) return n + 1;
    if (m > 0 && n == 0) return ackermann(m - 1, 1);
    return ackermann(m - 1, ackermann(m, n - 1));
}

// Driver
int m = 2;
int n = 1;
ackermann(m, n);"#,
        }],
    },
    Category {
        id: "custom",
        name: "My Code",
        description: "Write your own recursive function and driver code here. The visualizer will run exactly what you write.",
        presets: &[Preset {
            id: "playground",
            name: "Playground",
            shape: InputShape::None,
            default_input: "",
            params: &[],
            extra_args: &[],
            setup: &[],
            root_fn: "solve",
            code: r#"// Write your recursive function here
void solve(int n) {
    if (n <= 0) return;
    cout << "Step: " << n;
    solve(n - 1);
}

// Driver
// Call your function here with any arguments
solve(3);"#,
        }],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn preset(id: &str) -> &'static Preset {
        find(id).unwrap()
    }

    #[test]
    fn test_array_driver_declares_size_when_second_param_is_n() {
        assert_eq!(
            preset("sum_array").driver("4, 5").unwrap(),
            "vector<int> arr = {4, 5};\nint n = arr.size();\nsumArray(arr, n);"
        );
        assert_eq!(
            preset("merge_sort").driver("3, 1").unwrap(),
            "vector<int> arr = {3, 1};\nmergeSort(arr, 0, arr.size() - 1);"
        );
    }

    #[test]
    fn test_scalar_drivers() {
        assert_eq!(preset("factorial").driver(" 7 ").unwrap(), "int n = 7;\nfactorial(n);");
        assert_eq!(
            preset("tail_factorial").driver("4").unwrap(),
            "int n = 4;\ntailFactorial(n, 1);"
        );
        assert_eq!(
            preset("reverse_string").driver("\"abc\"").unwrap(),
            "string s = \"abc\";\nreverseString(s);"
        );
        assert_eq!(
            preset("reverse_string").driver("abc").unwrap(),
            "string s = \"abc\";\nreverseString(s);"
        );
    }

    #[test]
    fn test_multi_number_defaults_missing_parts_to_zero() {
        assert_eq!(
            preset("ackermann").driver("3").unwrap(),
            "int m = 3;\nint n = 0;\nackermann(m, n);"
        );
    }

    #[test]
    fn test_program_replaces_driver_section() {
        let program = preset("factorial").program("3");
        assert!(program.starts_with("int factorial(int n) {"));
        assert!(program.ends_with("\n// Driver\nint n = 3;\nfactorial(n);"));
        assert_eq!(program.matches(DRIVER_MARKER).count(), 1);
    }

    #[test]
    fn test_program_appends_driver_when_marker_missing() {
        assert_eq!(with_driver("int f() {}", "f();"), "int f() {}\n\n// Driver\nf();");
    }

    #[test]
    fn test_playground_ignores_input() {
        let playground = preset("custom:playground");
        assert_eq!(playground.driver("42"), None);
        assert_eq!(playground.program("42"), playground.code);
    }

    #[test]
    fn test_lookup_by_category() {
        assert!(find("tree:fibonacci").is_some());
        assert!(find("linear:fibonacci").is_none());
        assert_eq!(all().count(), 11);
    }
}

use super::helpers::*;
use lume_compiler::opcode::OpCode;
use lume_compiler::OptLevel;

const FIB: &str = "\
function fib(n)
  if n < 2 then
    return n
  end
  return fib(n - 1) + fib(n - 2)
end

print(fib(10))
";

#[test]
fn e2e_fib_compiles_at_every_level() {
    for level in [OptLevel::O0, OptLevel::O1, OptLevel::O2] {
        let chunk = compile_str(FIB, level);
        assert!(has_opcode(&chunk, OpCode::Closure));
        assert!(has_opcode(&chunk, OpCode::Call));
        assert!(has_opcode(&chunk, OpCode::Lt));
    }
}

#[test]
fn e2e_recursive_call_is_a_global_lookup() {
    // Without first-class functions, `fib` inside the body resolves as a
    // global, so recursion is two GETGLOBALs in the body plus the outer call.
    let chunk = compile_str(FIB, OptLevel::O0);
    assert!(count_opcode(&chunk, OpCode::GetGlobal) >= 3);
}

#[test]
fn e2e_sum_loop_program() {
    let source = "\
local sum = 0
for i = 1, 100 do
  sum = sum + i
end
print(sum)
";
    let chunk = compile_str(source, OptLevel::O1);
    assert!(has_opcode(&chunk, OpCode::ForPrep));
    assert!(has_opcode(&chunk, OpCode::ForLoop));
    assert!(has_opcode(&chunk, OpCode::Add));
}

#[test]
fn e2e_listing_has_all_sections_in_order() {
    let out = compile_listing("local x = \"hi\"\nprint(x)", OptLevel::O1);
    let title = out.find("-- lume bytecode listing").unwrap();
    let consts = out.find("-- Constants:").unwrap();
    let insts = out.find("-- Instructions:").unwrap();
    assert!(title < consts && consts < insts);
    assert!(out.contains("-- [0] = \"hi\""));
    assert!(out.contains("GETGLOBAL"));
}

#[test]
fn e2e_listing_every_line_is_a_comment_or_blank() {
    let out = compile_listing(FIB, OptLevel::O2);
    for line in out.lines() {
        assert!(
            line.is_empty() || line.starts_with("-- "),
            "unexpected line: {line:?}"
        );
    }
}

#[test]
fn e2e_listing_instruction_indices_are_dense() {
    let out = compile_listing("local a = 1\nlocal b = 2\nlocal c = a", OptLevel::O0);
    let section = out.split("-- Instructions:").nth(1).unwrap();
    for (i, line) in section.trim().lines().enumerate() {
        assert!(line.starts_with(&format!("-- [{i}] ")), "line: {line:?}");
    }
}

#[test]
fn e2e_identical_inputs_give_identical_listings() {
    for level in [OptLevel::O0, OptLevel::O1, OptLevel::O2] {
        let a = compile_listing(FIB, level);
        let b = compile_listing(FIB, level);
        assert_eq!(a, b);
    }
}

#[test]
fn e2e_whole_pipeline_string_table_program() {
    let source = "\
local names = {\"ada\", \"grace\", \"alan\"}
local banner = \"hello, \" .. \"world\"
if \"hello, \" .. \"world\" == \"hello, world\" then
  print(banner)
end
";
    let chunk = compile_str(source, OptLevel::O2);
    // Concat and the comparison both folded away; the branch dissolved.
    assert!(!has_opcode(&chunk, OpCode::Concat));
    assert!(!has_opcode(&chunk, OpCode::JmpF));
    assert!(has_string_constant(&chunk, "hello, world"));
    assert_eq!(count_opcode(&chunk, OpCode::SetIndex), 3);
}

#[test]
fn e2e_deep_nesting_compiles() {
    let source = "\
function outer(a)
  local total = 0
  for i = 1, a do
    while total < 100 do
      if total % 2 == 0 then
        total = total + i
      else
        total = total + 1
      end
    end
  end
  return total
end
";
    let chunk = compile_str(source, OptLevel::O2);
    assert!(has_opcode(&chunk, OpCode::ForLoop));
    assert!(has_opcode(&chunk, OpCode::Mod));
    assert!(count_opcode(&chunk, OpCode::Jmp) >= 2);
}

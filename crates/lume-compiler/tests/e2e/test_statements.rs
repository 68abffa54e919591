use super::helpers::*;
use lume_compiler::opcode::OpCode;
use lume_compiler::OptLevel;

#[test]
fn e2e_if_patches_forward_jump() {
    let chunk = compile_str("if c then x = 1 end", OptLevel::O0);
    let jmpf = find_opcode(&chunk, OpCode::JmpF).unwrap();
    let inst = &chunk.code[jmpf];
    // offset = target − jump_index − 1, landing at the end.
    assert_eq!(
        inst.b,
        chunk.code_len() as i32 - jmpf as i32 - 1
    );
}

#[test]
fn e2e_if_else_patches_both_jumps() {
    let chunk = compile_str("if c then x = 1 else x = 2 end", OptLevel::O0);
    let jmpf = find_opcode(&chunk, OpCode::JmpF).unwrap();
    let jmp = find_opcode(&chunk, OpCode::Jmp).unwrap();
    // The conditional jump lands just after the consequent's closing jump.
    assert_eq!(chunk.code[jmpf].b, (jmp + 1) as i32 - jmpf as i32 - 1);
    // The closing jump lands just after the alternate.
    assert_eq!(chunk.code[jmp].b, chunk.code_len() as i32 - jmp as i32 - 1);
}

#[test]
fn e2e_while_emits_negative_backward_offset() {
    let chunk = compile_str("while c do x = 1 end", OptLevel::O0);
    let back = find_opcode(&chunk, OpCode::Jmp).unwrap();
    assert!(chunk.code[back].b < 0);
    // Backward jump returns to the loop header at index 0.
    assert_eq!(chunk.code[back].b, -(back as i32) - 1);
    // The exit jump lands just past the backward jump.
    let exit = find_opcode(&chunk, OpCode::JmpF).unwrap();
    assert_eq!(chunk.code[exit].b, (back + 1) as i32 - exit as i32 - 1);
}

#[test]
fn e2e_for_loop_continuation_invariant() {
    let chunk = compile_str("for i = 1, 10 do x = i end", OptLevel::O0);
    let prep = find_opcode(&chunk, OpCode::ForPrep).unwrap();
    let cont = find_opcode(&chunk, OpCode::ForLoop).unwrap();
    // Continuation branches back to just after setup.
    assert_eq!(chunk.code[cont].b, (prep + 1) as i32 - cont as i32 - 1);
    // Setup's forward offset points past the loop.
    assert_eq!(chunk.code[prep].b, (cont + 1) as i32 - prep as i32 - 1);
}

#[test]
fn e2e_for_allocates_control_and_var_registers() {
    let chunk = compile_str("for i = 1, 3 do print(i) end", OptLevel::O0);
    let prep = find_opcode(&chunk, OpCode::ForPrep).unwrap();
    let base = chunk.code[prep].a;
    // First body instruction copies the control register into the loop var.
    let copy = &chunk.code[prep + 1];
    assert_eq!(copy.op, OpCode::Move);
    assert_eq!(copy.b, base);
    assert!(copy.a != base);
}

#[test]
fn e2e_for_step_defaults_to_one() {
    let chunk = compile_str("for i = 1, 5 do end", OptLevel::O0);
    assert!(has_number_constant(&chunk, 1.0));
}

#[test]
fn e2e_for_explicit_step() {
    let chunk = compile_str("for i = 10, 1, -2 do end", OptLevel::O0);
    assert!(has_opcode(&chunk, OpCode::Neg));
    assert!(has_number_constant(&chunk, 2.0));
}

#[test]
fn e2e_local_shadowing_inside_block() {
    // The inner `local x` shadows; the outer assignment after the block
    // still targets the original register.
    let chunk = compile_str(
        "local x = 1\nif c then local x = 2 end\nx = 3",
        OptLevel::O0,
    );
    // Final MOVE targets register 0, the outer x.
    let last_move = chunk
        .code
        .iter()
        .rev()
        .find(|i| i.op == OpCode::Move)
        .unwrap();
    assert_eq!(last_move.a, 0);
}

#[test]
fn e2e_function_body_is_jumped_over() {
    let chunk = compile_str("function f() x = 1 end", OptLevel::O0);
    let over = &chunk.code[0];
    assert_eq!(over.op, OpCode::Jmp);
    let closure = find_opcode(&chunk, OpCode::Closure).unwrap();
    assert_eq!(over.b, closure as i32 - 1);
}

#[test]
fn e2e_function_binds_global_by_name() {
    let chunk = compile_str("function greet() end", OptLevel::O0);
    assert!(has_opcode(&chunk, OpCode::Closure));
    assert!(has_opcode(&chunk, OpCode::SetGlobal));
    assert!(has_string_constant(&chunk, "greet"));
}

#[test]
fn e2e_return_value_flag() {
    let chunk = compile_str("function f()\n  return 1\nend", OptLevel::O0);
    assert!(chunk.code.iter().any(|i| i.op == OpCode::Return && i.b == 1));
    // The implicit fall-through return carries no value.
    assert!(chunk.code.iter().any(|i| i.op == OpCode::Return && i.b == 0));
}

#[test]
fn e2e_global_assignment() {
    let chunk = compile_str("answer = 42", OptLevel::O0);
    assert!(has_opcode(&chunk, OpCode::SetGlobal));
    assert!(has_string_constant(&chunk, "answer"));
}

#[test]
fn e2e_params_are_locals() {
    let chunk = compile_str("function f(a, b)\n  return a + b\nend", OptLevel::O0);
    // Parameters resolve to registers: the adds read moves, not globals.
    assert!(has_opcode(&chunk, OpCode::Add));
    assert_eq!(count_opcode(&chunk, OpCode::GetGlobal), 0);
}

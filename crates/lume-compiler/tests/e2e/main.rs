mod helpers;
mod test_errors;
mod test_optimizer;
mod test_programs;
mod test_statements;

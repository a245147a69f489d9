mod commands;
mod rcfile;

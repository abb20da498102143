// Schema texts substituted into the chain prompts as `{schema}`.

/// JSON Schema of `SimplifiedDocument`, as shown to the model.
pub const SIMPLIFIED_JSON_SCHEMA: &str = r##"{
  "type": "object",
  "properties": {
    "cells": {
      "type": "array",
      "description": "Array of cells.",
      "items": {
        "type": "object",
        "properties": {
          "title": { "type": "string", "description": "Title of the cell." },
          "color": { "type": "string", "description": "Color of the cell." },
          "position": {
            "type": "object",
            "properties": {
              "x": { "type": "number" },
              "y": { "type": "number" }
            },
            "required": ["x", "y"],
            "additionalProperties": false,
            "description": "Position of the cell, consider 200 units gap"
          },
          "connections": {
            "type": "array",
            "items": {
              "type": "string",
              "description": "Other cell titles that this cell is connected to."
            }
          },
          "groups": {
            "type": "array",
            "items": {
              "type": "string",
              "description": "Names of the groups this cell belongs to."
            }
          }
        },
        "required": ["title", "position", "connections"],
        "additionalProperties": false
      }
    }
  },
  "required": ["cells"],
  "additionalProperties": false
}"##;

/// Prose description of the CSV dialect, as shown to the model.
pub const CSV_SCHEMA: &str = r##"
1. Header Row Description:
   - title: A text string representing the name or title of an item.
   - color: A string in hexadecimal format representing a color (e.g., "#FFFFFF").
   - position.x: A numerical value representing the X-coordinate in a 2D space.
   - position.y: A numerical value representing the Y-coordinate in a 2D space.
   - connections: A list of strings, each naming another item this one links to.
   - groups: A list of strings, each naming a group the item belongs to.

2. Data Type Specifications:
   - title (string): Plain text, no special format.
   - color (hex string): '#' followed by 6 hexadecimal digits.
   - position.x (number) and position.y (number): Integer or floating-point numbers.
   - connections (string array): Semicolon-separated values in one field, e.g. "item1;item2;item3".
   - groups (string array): Semicolon-separated values in one field, e.g. "group1;group2".

3. Example Data Entry:
   title,color,position.x,position.y,connections,groups
   Gadget Pro,#00FF77,102,305,ConnectorA;ConnectorB;ConnectorC,GroupA;GroupB

4. Output Rules:
   - Wrap the CSV in a fenced code block.
   - The first line is the header row above, in that column order.
   - Do not quote fields and do not use commas inside a field.
"##;
